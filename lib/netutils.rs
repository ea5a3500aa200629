use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use anyhow::Result;

pub fn parse_addr(address: &str, port: u16) -> Result<SocketAddr> {
    Ok(SocketAddr::from((IpAddr::from_str(address)?, port)))
}
