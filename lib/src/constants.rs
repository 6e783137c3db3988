// 0x2112A442
pub const MAGIC_COOKIE: [u8; 4] = [0x21, 0x12, 0xA4, 0x42];

pub const TRANS_ID_LEN: usize = 16;
pub const HEADER_LEN: usize = 20;

// header + 一个attr的TLV头, 解析接受的最小包
pub const MIN_PACKET_LEN: usize = 24;

pub const MESSAGE_TYPE_BIND_REQ: u16 = 0x0001;
pub const MESSAGE_TYPE_BIND_RES: u16 = 0x0101;
pub const MESSAGE_TYPE_BIND_ERR_RES: u16 = 0x0111;

pub const ATTR_FAMILY_IPV4: u8 = 0x01;
pub const ATTR_FAMILY_IPV6: u8 = 0x02;

pub const ATTR_MAPPED_ADDRESS: u16 = 0x0001;
pub const ATTR_SOURCE_ADDRESS: u16 = 0x0004;
pub const ATTR_CHANGED_ADDRESS: u16 = 0x0005;

pub const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;
pub const ATTR_XOR_MAPPED_ADDRESS_EXP: u16 = 0x8020;

// rfc 3489, 9.3
pub const INIT_TIMEOUT_MS: u64 = 100;
pub const MAX_TIMEOUT_MS: u64 = 1600;
pub const MAX_ATTEMPTS: u32 = 9;
