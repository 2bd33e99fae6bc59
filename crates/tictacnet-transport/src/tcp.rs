use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::PeerStream;

/// Host side of a session: listens for exactly one opponent.
///
/// [`accept_one`](HostListener::accept_one) consumes the listener, so the
/// listening socket is closed as soon as the opponent is connected and a
/// second player can never join.
pub struct HostListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HostListener {
    /// Bind and listen on `ip:port`. Port `0` lets the OS pick.
    pub fn bind(ip: IpAddr, port: u16) -> Result<Self> {
        let addr = SocketAddr::new(ip, port);
        let listener =
            TcpListener::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind { addr, source })?;

        info!(%local_addr, "listening for opponent");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// The address actually bound (with the resolved port).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until one opponent connects, then close the listener.
    ///
    /// The listener is polled in non-blocking mode every `poll_interval`
    /// so that `cancel`, set from another thread, aborts the wait with
    /// [`TransportError::Shutdown`].
    pub fn accept_one(self, cancel: &AtomicBool, poll_interval: Duration) -> Result<PeerStream> {
        self.listener
            .set_nonblocking(true)
            .map_err(TransportError::Accept)?;

        loop {
            if cancel.load(Ordering::SeqCst) {
                debug!("accept cancelled");
                return Err(TransportError::Shutdown);
            }

            match self.listener.accept() {
                Ok((stream, peer)) => {
                    stream
                        .set_nonblocking(false)
                        .map_err(TransportError::Accept)?;
                    info!(%peer, "opponent connected; closing listener");
                    return PeerStream::from_tcp(stream);
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(poll_interval);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Accept(err)),
            }
        }
    }
}

/// Connect to a listening host, giving up after `timeout`.
pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<PeerStream> {
    let stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|source| TransportError::Connect { addr, source })?;
    debug!(%addr, "connected to host");
    PeerStream::from_tcp(stream)
}
