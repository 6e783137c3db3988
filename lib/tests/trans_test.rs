use bytes::Bytes;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use stun_probe::attr::Attr;
use stun_probe::constants::*;
use stun_probe::error::TransErr;
use stun_probe::packet::Packet;
use stun_probe::trans::{send_request, TransOpts};
use stun_probe::transport::Transport;

// 按脚本出牌的socket: 每次recv_from消耗一个step
enum Step {
    Reply(Vec<u8>),
    Timeout,
    ReadErr(io::ErrorKind),
}

struct MockSock {
    steps: RefCell<VecDeque<Step>>,
    sent: RefCell<Vec<Vec<u8>>>,
    timeouts: RefCell<Vec<Duration>>,
    peer: SocketAddr,
    short_write: bool,
}

impl MockSock {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: RefCell::new(steps.into()),
            sent: RefCell::new(vec![]),
            timeouts: RefCell::new(vec![]),
            peer: "198.51.100.9:3478".parse().expect("unable to parse"),
            short_write: false,
        }
    }
}

impl Transport for MockSock {
    fn send_to(&self, buf: &[u8], _addr: SocketAddr) -> io::Result<usize> {
        self.sent.borrow_mut().push(buf.to_vec());
        if self.short_write {
            return Ok(buf.len() / 2);
        }
        Ok(buf.len())
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        match self.steps.borrow_mut().pop_front() {
            Some(Step::Reply(data)) => {
                buf[..data.len()].copy_from_slice(&data);
                Ok((data.len(), self.peer))
            }
            Some(Step::Timeout) | None => {
                Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out"))
            }
            Some(Step::ReadErr(kind)) => Err(io::Error::new(kind, "read failed")),
        }
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.timeouts.borrow_mut().push(dur.expect("engine always arms a deadline"));
        Ok(())
    }
}

fn new_response(request: &Packet, mapped: SocketAddr) -> Vec<u8> {
    let mut response = Packet::new_request(MESSAGE_TYPE_BIND_RES);
    response.trans_id = request.trans_id;
    response.add_attr(Attr::from_address(ATTR_MAPPED_ADDRESS, mapped));
    response.pack().to_vec()
}

#[test]
pub fn test_match_on_first_attempt() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let mapped: SocketAddr = "203.0.113.5:54321".parse().expect("unable to parse");

    let sock = MockSock::new(vec![Step::Reply(new_response(&request, mapped))]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default()).unwrap();
    let (from, response) = result.expect("expected a reply");

    assert_eq!(from, sock.peer);
    assert_eq!(response.trans_id, request.trans_id);
    assert_eq!(response.mapped_addr(), Some(mapped));

    // 只用了9次里的第1次
    assert_eq!(sock.sent.borrow().len(), 1);
    assert_eq!(sock.timeouts.borrow()[0], Duration::from_millis(100));
}

#[test]
pub fn test_sent_frame_matches_request() {
    let mut request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    request.add_attr(Attr::new(0x7f00, Bytes::from_static(b"hello")));

    let mapped: SocketAddr = "203.0.113.5:54321".parse().expect("unable to parse");
    let sock = MockSock::new(vec![Step::Reply(new_response(&request, mapped))]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    send_request(&sock, server, &request, &TransOpts::default()).unwrap();
    assert_eq!(sock.sent.borrow()[0], request.pack().to_vec());
}

#[test]
pub fn test_mismatched_trans_id_discarded() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let mapped: SocketAddr = "203.0.113.5:54321".parse().expect("unable to parse");

    // 别人的响应在前面, 必须跳过而不是结束等待
    let stranger = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let sock = MockSock::new(vec![
        Step::Reply(new_response(&stranger, mapped)),
        Step::Reply(new_response(&request, mapped)),
    ]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default()).unwrap();
    let (_, response) = result.expect("expected a reply");

    assert_eq!(response.trans_id, request.trans_id);
    assert_eq!(sock.sent.borrow().len(), 1);
}

#[test]
pub fn test_retry_then_match() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let mapped: SocketAddr = "203.0.113.5:54321".parse().expect("unable to parse");

    let sock = MockSock::new(vec![
        Step::Timeout,
        Step::Timeout,
        Step::Reply(new_response(&request, mapped)),
    ]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default()).unwrap();
    assert!(result.is_some());
    assert_eq!(sock.sent.borrow().len(), 3);
    assert_eq!(
        *sock.timeouts.borrow(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
        ]
    );
}

#[test]
pub fn test_exhaustion_backoff_schedule() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let sock = MockSock::new(vec![]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default()).unwrap();

    // 没有响应也没有错误
    assert!(result.is_none());
    assert_eq!(sock.sent.borrow().len(), MAX_ATTEMPTS as usize);
    assert_eq!(
        *sock.timeouts.borrow(),
        vec![100u64, 200, 400, 800, 1600, 1600, 1600, 1600, 1600]
            .into_iter()
            .map(Duration::from_millis)
            .collect::<Vec<_>>()
    );
}

#[test]
pub fn test_short_write_fatal() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let mut sock = MockSock::new(vec![]);
    sock.short_write = true;
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default());
    assert!(matches!(result, Err(TransErr::ShortWrite(_))));
    assert_eq!(sock.sent.borrow().len(), 1);
}

#[test]
pub fn test_read_error_fatal() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let sock = MockSock::new(vec![Step::ReadErr(io::ErrorKind::ConnectionRefused)]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default());
    assert!(matches!(result, Err(TransErr::Read(_))));
    assert_eq!(sock.sent.borrow().len(), 1);
}

#[test]
pub fn test_garbage_datagram_discarded() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let mapped: SocketAddr = "203.0.113.5:54321".parse().expect("unable to parse");

    let sock = MockSock::new(vec![
        Step::Reply(vec![1, 2, 3]),
        Step::Reply(new_response(&request, mapped)),
    ]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default()).unwrap();
    assert!(result.is_some());
    assert_eq!(sock.sent.borrow().len(), 1);
}

#[test]
pub fn test_garbage_datagram_strict() {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let sock = MockSock::new(vec![Step::Reply(vec![1, 2, 3])]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let opts = TransOpts {
        strict: true,
        ..TransOpts::default()
    };
    let result = send_request(&sock, server, &request, &opts);
    assert!(matches!(result, Err(TransErr::Parse(_))));
}

#[test]
pub fn test_binding_exchange() {
    // 完整流程: binding request -> 带mapped address的response
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    let mapped: SocketAddr = "203.0.113.5:54321".parse().expect("unable to parse");

    let sock = MockSock::new(vec![Step::Reply(new_response(&request, mapped))]);
    let server = "198.51.100.9:3478".parse().expect("unable to parse");

    let result = send_request(&sock, server, &request, &TransOpts::default()).unwrap();
    let (from, response) = result.expect("expected a reply");

    assert_eq!(from, sock.peer);
    assert_eq!(response.msg_type, MESSAGE_TYPE_BIND_RES);
    assert_eq!(response.mapped_addr(), Some(mapped));
    assert_eq!(sock.sent.borrow().len(), 1);
}
