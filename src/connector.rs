//! Upstream connector (C7).
//!
//! Opens the TCP connection to the origin server once C4/C6 have settled on
//! a concrete address: either an `ip:port` literal taken straight from the
//! request, or a resolved hostname on the default port 80.

use crate::error::ConnectError;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpStream;

/// A fully resolved upstream target, ready to connect to.
#[derive(Debug, Clone, Copy)]
pub enum ConnectTarget {
    IpLiteral(Ipv4Addr, u16),
    Resolved(SocketAddr),
}

impl ConnectTarget {
    fn socket_addr(&self) -> SocketAddr {
        match self {
            ConnectTarget::IpLiteral(ip, port) => SocketAddr::new((*ip).into(), *port),
            ConnectTarget::Resolved(addr) => *addr,
        }
    }
}

/// Connects to `target`, returning the open stream or the connect error.
pub async fn connect(target: ConnectTarget) -> Result<TcpStream, ConnectError> {
    TcpStream::connect(target.socket_addr())
        .await
        .map_err(ConnectError)
}
