use std::net::SocketAddr;

use tictacnet_transport::HostListener;
use tracing::info;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::lifecycle::StopFlag;
use crate::link::Link;

/// Host side before the opponent arrives.
pub struct SessionListener {
    listener: HostListener,
    config: SessionConfig,
}

impl SessionListener {
    /// Validate `config` and start listening on its bind address and port.
    pub fn bind(config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        let listener = HostListener::bind(config.bind_ip, config.port)?;
        Ok(Self {
            listener,
            config: config.clone(),
        })
    }

    /// Bound address, with the resolved port.
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Wait for exactly one opponent. The listening socket is closed when
    /// this returns, whatever the result.
    ///
    /// Setting `stop` from another thread abandons the wait with
    /// [`TransportError::Shutdown`](tictacnet_transport::TransportError::Shutdown).
    pub fn accept(self, stop: &StopFlag) -> Result<Link> {
        let stream = self
            .listener
            .accept_one(stop.as_atomic(), self.config.accept_poll_interval)?;
        let link = Link::from_stream(stream, &self.config)?;
        info!(peer = %link.peer_addr(), "opponent joined");
        Ok(link)
    }
}
