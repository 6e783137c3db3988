use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

// 事务引擎消费的datagram端点, 和std UdpSocket的接口对齐
pub trait Transport {
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()>;
}

impl Transport for UdpSocket {
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf)
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        UdpSocket::set_read_timeout(self, dur)
    }
}

// 读超时在unix上是WouldBlock, windows上是TimedOut
pub fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
