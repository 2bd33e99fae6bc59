use std::net::SocketAddr;

use tictacnet_frame::{LineReader, LineWriter};
use tictacnet_transport::PeerStream;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::sender::StreamSender;

/// A connected data socket, split into its read and write halves.
///
/// The read half goes to the receive thread and the write half to the
/// session owner, so neither side needs a lock.
pub struct Link {
    reader: LineReader<PeerStream>,
    sender: StreamSender,
    peer_addr: SocketAddr,
}

impl Link {
    /// Split `stream` and apply the configured timeouts and line limit.
    pub fn from_stream(stream: PeerStream, config: &SessionConfig) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;
        let reader_stream = stream.try_clone()?;
        let frame_config = config.frame_config();

        let reader = LineReader::with_config_peer(reader_stream, frame_config.clone())?;
        let writer = LineWriter::with_config_peer(stream, frame_config)?;

        Ok(Self {
            reader,
            sender: StreamSender::new(writer),
            peer_addr,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn into_parts(self) -> (LineReader<PeerStream>, StreamSender) {
        (self.reader, self.sender)
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("peer_addr", &self.peer_addr)
            .finish_non_exhaustive()
    }
}
