use std::net::SocketAddr;

use tracing::info;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::link::Link;

/// Connect to a waiting host, giving up after `config.connect_timeout`.
pub fn join(addr: SocketAddr, config: &SessionConfig) -> Result<Link> {
    config.validate()?;
    let stream = tictacnet_transport::connect(addr, config.connect_timeout)?;
    let link = Link::from_stream(stream, config)?;
    info!(host = %addr, "joined game");
    Ok(link)
}
