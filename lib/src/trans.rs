use crate::constants::*;
use crate::error::TransErr;
use crate::packet::Packet;
use crate::transport::{is_timeout, Transport};
use crate::util::print_bytes;
use bytes::Bytes;
use log::debug;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct TransOpts {
    // 收发包打hex dump, 只影响日志
    pub trace: bool,

    // 入站包解析失败时中止交换, 默认丢弃继续等
    pub strict: bool,
}

// rfc 3489, 9.3
// 100ms起步每次翻倍, 1.6s封顶, 最多发9次
//
// Ok(None): 9次都没等到匹配的响应, 服务器不可达
pub fn send_request<T: Transport>(
    sock: &T,
    server: SocketAddr,
    request: &Packet,
    opts: &TransOpts,
) -> Result<Option<(SocketAddr, Packet)>, TransErr> {
    let data = request.pack();
    if opts.trace {
        debug!("--> {}\n{}", server, print_bytes(&data, " ", 8));
    }

    let mut recv_buf = vec![0u8; 32 * 1024];
    let mut timeout = INIT_TIMEOUT_MS;

    for attempt in 0..MAX_ATTEMPTS {
        let sent = sock.send_to(&data, server).map_err(TransErr::Write)?;
        if sent != data.len() {
            // 短写不重试
            return Err(TransErr::ShortWrite(format!(
                "sent:{} != {}",
                sent,
                data.len()
            )));
        }
        debug!("attempt:{} sent:{} timeout:{}ms", attempt + 1, sent, timeout);

        sock.set_read_timeout(Some(Duration::from_millis(timeout)))
            .map_err(TransErr::Read)?;
        let deadline = Instant::now() + Duration::from_millis(timeout);

        if timeout < MAX_TIMEOUT_MS {
            timeout *= 2;
        }

        loop {
            let (len, from) = match sock.recv_from(&mut recv_buf) {
                Ok(v) => v,
                Err(e) if is_timeout(&e) => break,
                Err(e) => return Err(TransErr::Read(e)),
            };

            let buf = Bytes::copy_from_slice(&recv_buf[..len]);
            match Packet::unpack(buf) {
                Ok(response) if response.trans_id == request.trans_id => {
                    if opts.trace {
                        debug!("<-- {}\n{}", from, print_bytes(&recv_buf[..len], " ", 8));
                    }
                    return Ok(Some((from, response)));
                }
                Ok(_) => {
                    // 同一个socket上的无关流量
                    debug!("drop datagram from {}: trans_id mismatch", from);
                }
                Err(e) => {
                    if opts.strict {
                        return Err(TransErr::Parse(e));
                    }
                    debug!("drop datagram from {}: {:?}", from, e);
                }
            }

            // deadline不重置, 用剩余时间继续等
            let remain = deadline.saturating_duration_since(Instant::now());
            if remain.is_zero() {
                break;
            }
            sock.set_read_timeout(Some(remain)).map_err(TransErr::Read)?;
        }
    }

    Ok(None)
}
