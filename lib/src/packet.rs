use crate::attr::Attr;
use crate::constants::*;
use crate::error::ParseErr;
use crate::util;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::SocketAddr;
use std::ops::Deref;

// magic cookie(4) + 12字节随机
pub type TransId = [u8; TRANS_ID_LEN];

// rfc 3489, 11.1
// header: type(2) + length(2) + trans_id(16)
// length不含header的20字节, 含每个attr的TLV头和padding
#[derive(Debug, Clone)]
pub struct Packet {
    pub msg_type: u16,
    pub msg_len: u16,
    pub trans_id: TransId,
    pub attrs: Vec<Attr>,
}

impl Packet {
    pub fn new_request(msg_type: u16) -> Self {
        Self {
            msg_type,
            msg_len: 0,
            trans_id: util::new_trans_id(),
            attrs: vec![],
        }
    }

    // 唯一的attr追加入口, msg_len跟着变
    pub fn add_attr(&mut self, attr: Attr) {
        self.msg_len += attr.wire_len() as u16;
        self.attrs.push(attr);
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.msg_len as usize);

        buf.put_u16(self.msg_type);
        buf.put_u16(self.msg_len);
        buf.put_slice(&self.trans_id);
        for v in self.attrs.iter() {
            buf.put_slice(&v.pack());
        }

        buf.freeze()
    }

    pub fn unpack(buf_bytes: Bytes) -> Result<Self, ParseErr> {
        let buf = buf_bytes.deref();

        if buf.len() < MIN_PACKET_LEN {
            return Err(ParseErr::BufSize(format!(
                "packet buf len:{} < {}",
                buf.len(),
                MIN_PACKET_LEN
            )));
        }

        let msg_type = u16::from_be_bytes([buf[0], buf[1]]);

        // wire上的length字段只用于对端分帧, 本地重新累加
        let _msg_len = u16::from_be_bytes([buf[2], buf[3]]);

        // 从接收buf复制出来, 包的生命周期和buf复用无关
        let mut trans_id = [0_u8; TRANS_ID_LEN];
        trans_id.copy_from_slice(&buf[4..HEADER_LEN]);

        let mut packet = Self {
            msg_type,
            msg_len: 0,
            trans_id,
            attrs: vec![],
        };

        let mut pos = HEADER_LEN;
        while pos < buf.len() {
            if pos + 4 > buf.len() {
                return Err(ParseErr::BufSize(format!(
                    "attr header at:{}, buf len:{}",
                    pos,
                    buf.len()
                )));
            }

            let attr_type = u16::from_be_bytes([buf[pos], buf[pos + 1]]);
            let attr_len = u16::from_be_bytes([buf[pos + 2], buf[pos + 3]]) as usize;

            if pos + 4 + attr_len > buf.len() {
                return Err(ParseErr::BufSize(format!(
                    "attr len:{} at:{} > buf len:{}",
                    attr_len,
                    pos,
                    buf.len()
                )));
            }

            let value = buf_bytes.slice(pos + 4..pos + 4 + attr_len);
            packet.add_attr(Attr::new(attr_type, value));

            // 跳过padding, 不解码
            pos += 4 + util::align(attr_len);
        }

        Ok(packet)
    }

    pub fn mapped_addr(&self) -> Option<SocketAddr> {
        self.find_addr(ATTR_MAPPED_ADDRESS)
    }

    pub fn source_addr(&self) -> Option<SocketAddr> {
        self.find_addr(ATTR_SOURCE_ADDRESS)
    }

    pub fn changed_addr(&self) -> Option<SocketAddr> {
        self.find_addr(ATTR_CHANGED_ADDRESS)
    }

    // 两个type code解码方式相同
    pub fn xor_mapped_addr(&self) -> Option<SocketAddr> {
        self.attrs
            .iter()
            .find(|v| {
                v.attr_type == ATTR_XOR_MAPPED_ADDRESS || v.attr_type == ATTR_XOR_MAPPED_ADDRESS_EXP
            })
            .and_then(|v| v.xor_address(&self.trans_id))
    }

    fn find_addr(&self, attr_type: u16) -> Option<SocketAddr> {
        self.attrs
            .iter()
            .find(|v| v.attr_type == attr_type)
            .and_then(|v| v.address())
    }
}
