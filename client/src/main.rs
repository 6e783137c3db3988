use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use clap::builder::ValueParser;
use clap::{Arg, Command};
use client::probe::probe;
use log::debug;
use stun_probe::trans::TransOpts;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn parse_ip(s: &str) -> Result<IpAddr, String> {
    let ip = match s.parse::<IpAddr>() {
        Ok(v) => v,
        Err(e) => {
            return Err(format!("{}", e));
        }
    };

    Ok(ip)
}

fn parse_addr(s: &str) -> Result<SocketAddr, String> {
    let addr = match s.parse::<SocketAddr>() {
        Ok(v) => v,
        Err(e) => {
            return Err(format!("{}", e));
        }
    };
    // 不能是 0.0.0.0
    match addr {
        SocketAddr::V4(addr_v4) => {
            let value = u32::from_be_bytes(addr_v4.ip().octets());
            if value == 0 {
                return Err("0.0.0.0 not allow".to_string());
            }
        }
        SocketAddr::V6(_) => {
            return Err("ipv6 not support".to_string());
        }
    }

    Ok(addr)
}

fn main() {
    env_logger::init();

    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun client for probing the public address")
        .arg(
            Arg::new("server")
                .long("server")
                .takes_value(true)
                .required(true)
                .help("stun server address")
                .value_parser(ValueParser::new(parse_addr)),
        )
        .arg(
            Arg::new("local_ip")
                .long("local_ip")
                .takes_value(true)
                .help("local ip to bind, default 0.0.0.0")
                .value_parser(ValueParser::new(parse_ip)),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .takes_value(false)
                .help("hex dump every sent/received packet"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .takes_value(false)
                .help("abort when a reply fails to parse"),
        )
        .get_matches();

    let server: SocketAddr = *app.get_one("server").expect("wrong server address");
    let local_ip: IpAddr = app
        .get_one("local_ip")
        .copied()
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let opts = TransOpts {
        trace: app.is_present("trace"),
        strict: app.is_present("strict"),
    };

    let sock = UdpSocket::bind(SocketAddr::new(local_ip, 0)).expect("can't bind");
    debug!("local addr: {:?}", sock.local_addr());

    probe(&sock, server, &opts);
}
