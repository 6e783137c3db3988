use crate::constants::{MAGIC_COOKIE, TRANS_ID_LEN};
use crate::packet::TransId;
use rand::prelude::*;
use std::fmt::Write as _;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

// attr value在wire上4字节对齐, attr_len里不含padding
pub fn align(n: usize) -> usize {
    (n + 3) / 4 * 4
}

pub fn print_bytes(buf: &[u8], separator: &str, row_width: usize) -> String {
    let mut hex = String::new();
    buf.iter().enumerate().for_each(|(x, y)| {
        let _ = write!(hex, "{:02X}", y);
        if (x + 1) % row_width == 0 {
            hex.push('\n');
        } else {
            hex.push_str(separator);
        }
    });

    hex
}

pub fn new_trans_id() -> TransId {
    let cookie_len = MAGIC_COOKIE.len();
    let mut trans_id = [0u8; TRANS_ID_LEN];

    trans_id[..cookie_len].copy_from_slice(&MAGIC_COOKIE[..]);
    rand::thread_rng().fill_bytes(&mut trans_id[4..]);
    trans_id
}

pub fn xor_address_v4(addr: SocketAddrV4) -> SocketAddrV4 {
    let port = addr.port();
    let magic_prefix = u16::from_be_bytes([MAGIC_COOKIE[0], MAGIC_COOKIE[1]]);
    let port = port ^ magic_prefix;

    let src_buf = addr.ip().octets();
    let mut buf = [0_u8; 4];
    for i in 0..buf.len() {
        buf[i] = src_buf[i] ^ MAGIC_COOKIE[i];
    }

    SocketAddrV4::new(Ipv4Addr::from(buf), port)
}

pub fn xor_address_v6(addr: SocketAddrV6, trans_id: &TransId) -> SocketAddrV6 {
    let port = addr.port();
    let magic_prefix = u16::from_be_bytes([MAGIC_COOKIE[0], MAGIC_COOKIE[1]]);
    let port = port ^ magic_prefix;

    let src_buf = addr.ip().octets();
    let mut buf = [0_u8; 16];
    for i in 0..buf.len() {
        buf[i] = src_buf[i] ^ trans_id[i];
    }

    SocketAddrV6::new(Ipv6Addr::from(buf), port, 0, 0)
}

// xor是自反的, 编码解码同一个变换
pub fn xor_address(addr: SocketAddr, trans_id: &TransId) -> SocketAddr {
    match addr {
        SocketAddr::V4(v) => SocketAddr::V4(xor_address_v4(v)),
        SocketAddr::V6(v) => SocketAddr::V6(xor_address_v6(v, trans_id)),
    }
}
