//! Address helpers for the host side: what port to listen on and what address
//! to tell the opponent.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, UdpSocket};

use tracing::debug;

use crate::error::{Result, TransportError};

/// Public address used only to pick a route; no packets are sent to it.
const ROUTE_PROBE: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Return a TCP port that is currently free on all interfaces.
///
/// The port is released before returning, so another process may grab it
/// before the host binds. Binding port `0` directly avoids that race when the
/// port does not need to be known in advance.
pub fn allocate_listen_port() -> Result<u16> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
    let listener = TcpListener::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
    let port = listener.local_addr()?.port();
    debug!(port, "allocated listen port");
    Ok(port)
}

/// Best-effort outward-facing IP of this machine, for display to the user.
///
/// Falls back to loopback when there is no route.
pub fn detect_local_address() -> IpAddr {
    match probe_route() {
        Ok(ip) => ip,
        Err(err) => {
            debug!(error = %err, "local address detection failed; using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn probe_route() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))?;
    socket.connect(ROUTE_PROBE)?;
    let ip = socket.local_addr()?.ip();
    if ip.is_unspecified() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "no outward-facing address",
        ));
    }
    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_port_is_bindable() {
        let port = allocate_listen_port().unwrap();
        assert_ne!(port, 0);
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
        assert!(listener.is_ok());
    }

    #[test]
    fn detected_address_is_never_unspecified() {
        let ip = detect_local_address();
        assert!(!ip.is_unspecified());
    }
}
