use log::{debug, error};
use std::io;
use std::io::Error;
use std::net::{SocketAddr, UdpSocket};
use stun_probe::constants::MESSAGE_TYPE_BIND_REQ;
use stun_probe::error::TransErr;
use stun_probe::packet::Packet;
use stun_probe::trans::{send_request, TransOpts};

#[derive(Debug)]
pub struct ProbeError(pub String);

impl From<io::Error> for ProbeError {
    fn from(e: Error) -> Self {
        ProbeError(format!("{}", e))
    }
}

impl From<TransErr> for ProbeError {
    fn from(e: TransErr) -> Self {
        ProbeError(format!("{:?}", e))
    }
}

//--------------------------------------
pub struct ProbeResult {
    pub from: SocketAddr,
    pub mapped_address: Option<SocketAddr>,
    pub source_address: Option<SocketAddr>,
    pub changed_address: Option<SocketAddr>,
    pub xor_mapped_address: Option<SocketAddr>,
}

//---------------------------------------
pub fn probe(sock: &UdpSocket, server: SocketAddr, opts: &TransOpts) {
    match probe_once(sock, server, opts) {
        Ok(Some(v)) => {
            println!("response from: {}", v.from);
            println!("mapped_address: {}", fmt_addr(v.mapped_address));
            println!("source_address: {}", fmt_addr(v.source_address));
            println!("changed_address: {}", fmt_addr(v.changed_address));
            println!("xor_mapped_address: {}", fmt_addr(v.xor_mapped_address));
        }
        Ok(None) => {
            println!("no reply from {}", server);
        }
        Err(e) => {
            error!("error, probe_once, {:?}", e);
        }
    }
}

pub fn probe_once(
    sock: &UdpSocket,
    server: SocketAddr,
    opts: &TransOpts,
) -> Result<Option<ProbeResult>, ProbeError> {
    let request = Packet::new_request(MESSAGE_TYPE_BIND_REQ);
    debug!("request len: {}", request.pack().len());

    let reply = send_request(sock, server, &request, opts)?;

    Ok(reply.map(|(from, response)| ProbeResult {
        from,
        mapped_address: response.mapped_addr(),
        source_address: response.source_addr(),
        changed_address: response.changed_addr(),
        xor_mapped_address: response.xor_mapped_addr(),
    }))
}

fn fmt_addr(addr: Option<SocketAddr>) -> String {
    match addr {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}
