use crate::constants::*;
use crate::packet::TransId;
use crate::util;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

// rfc 3489, 11.2
//
// 地址类attr的value: 1字节保留 + 1字节family + 2字节port + 4/16字节ip
// 未识别的attr_type原样保留

#[derive(Debug, Clone)]
pub struct Attr {
    pub attr_type: u16,
    pub attr_len: u16,
    pub value: Bytes,
}

impl Attr {
    pub fn new(attr_type: u16, value: Bytes) -> Self {
        Self {
            attr_type,
            attr_len: value.len() as u16,
            value,
        }
    }

    pub fn from_address(attr_type: u16, address: SocketAddr) -> Self {
        let (family, port, ip_bytes) = match &address {
            SocketAddr::V4(addr) => {
                let ip_bytes: Vec<u8> = addr.ip().octets().into();
                (ATTR_FAMILY_IPV4, addr.port(), ip_bytes)
            }
            SocketAddr::V6(addr) => {
                let ip_bytes: Vec<u8> = addr.ip().octets().into();
                (ATTR_FAMILY_IPV6, addr.port(), ip_bytes)
            }
        };

        let mut bytes_buf = BytesMut::with_capacity(4 + ip_bytes.len());
        bytes_buf.put_u8(0);
        bytes_buf.put_u8(family);
        bytes_buf.put_u16(port);
        bytes_buf.put_slice(&ip_bytes);

        Self::new(attr_type, bytes_buf.freeze())
    }

    pub fn from_xor_address(trans_id: &TransId, address: SocketAddr) -> Self {
        let masked = util::xor_address(address, trans_id);
        Self::from_address(ATTR_XOR_MAPPED_ADDRESS, masked)
    }

    // TLV头 + padding后的value, 在wire上占的字节数
    pub fn wire_len(&self) -> usize {
        util::align(self.attr_len as usize) + 4
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());

        buf.put_u16(self.attr_type);
        buf.put_u16(self.attr_len);
        buf.put_slice(&self.value);
        buf.put_bytes(0, util::align(self.attr_len as usize) - self.attr_len as usize);

        buf.freeze()
    }

    // 畸形value按缺失处理, 不报错
    pub fn address(&self) -> Option<SocketAddr> {
        let value = &self.value;
        if value.len() < 4 {
            return None;
        }

        let family = value[1];
        let port = u16::from_be_bytes([value[2], value[3]]);

        match family {
            ATTR_FAMILY_IPV4 => {
                if value.len() < 8 {
                    return None;
                }
                let mut addr = [0_u8; 4];
                addr.copy_from_slice(&value[4..8]);
                Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::from(addr)), port))
            }
            ATTR_FAMILY_IPV6 => {
                if value.len() < 20 {
                    return None;
                }
                let mut addr = [0_u8; 16];
                addr.copy_from_slice(&value[4..20]);
                Some(SocketAddr::new(IpAddr::V6(Ipv6Addr::from(addr)), port))
            }
            _ => None,
        }
    }

    pub fn xor_address(&self, trans_id: &TransId) -> Option<SocketAddr> {
        self.address().map(|v| util::xor_address(v, trans_id))
    }
}
