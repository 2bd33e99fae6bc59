use tictacnet_frame::{LineWriter, Message};
use tictacnet_transport::PeerStream;
use tracing::{debug, trace};

use crate::error::Result;

/// Where a session writes its outgoing messages.
pub trait Outbound {
    /// Write one message, blocking until it is handed to the OS.
    fn send(&mut self, message: &Message) -> Result<()>;

    /// Close the connection. Called once when the session ends.
    fn close(&mut self);
}

/// Writes messages to the write half of the data socket.
pub struct StreamSender {
    writer: LineWriter<PeerStream>,
}

impl StreamSender {
    pub fn new(writer: LineWriter<PeerStream>) -> Self {
        Self { writer }
    }
}

impl Outbound for StreamSender {
    fn send(&mut self, message: &Message) -> Result<()> {
        trace!(tag = message.tag(), "sending message");
        self.writer.send(message)?;
        Ok(())
    }

    fn close(&mut self) {
        // Both directions, so the receive thread's pending read returns.
        if let Err(err) = self.writer.get_ref().shutdown() {
            debug!(error = %err, "socket shutdown failed");
        }
    }
}

impl<T: Outbound + ?Sized> Outbound for Box<T> {
    fn send(&mut self, message: &Message) -> Result<()> {
        (**self).send(message)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
