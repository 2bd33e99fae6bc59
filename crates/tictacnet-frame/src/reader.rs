use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tictacnet_transport::PeerStream;
use tracing::trace;

use crate::codec::{decode_line, FrameConfig, DELIMITER};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete `\n`-terminated lines from any `Read` stream.
///
/// Handles partial reads internally: callers always get whole lines, in wire
/// order. Read timeouts surface as [`FrameError::Io`] with the buffered bytes
/// kept, so the caller can simply call [`read_line`](Self::read_line) again.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    /// Set after an over-long partial line; bytes are dropped up to the next
    /// terminator.
    discarding: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarding: false,
        }
    }

    /// Read the next complete line (blocking), trailing whitespace stripped.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; a
    /// trailing partial line without terminator is dropped.
    pub fn read_line(&mut self) -> Result<String> {
        loop {
            if self.discarding {
                self.skip_to_delimiter();
            }

            if !self.discarding {
                if let Some(line) = decode_line(&mut self.buf, self.config.max_line_len)? {
                    trace!(len = line.len(), "line received");
                    return Ok(line);
                }

                if self.buf.len() > self.config.max_line_len {
                    let size = self.buf.len();
                    self.buf.clear();
                    self.discarding = true;
                    return Err(FrameError::LineTooLong {
                        size,
                        max: self.config.max_line_len,
                    });
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    fn skip_to_delimiter(&mut self) {
        match self.buf.iter().position(|&b| b == DELIMITER) {
            Some(pos) => {
                let _ = self.buf.split_to(pos + 1);
                self.discarding = false;
            }
            None => self.buf.clear(),
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl LineReader<PeerStream> {
    /// Create a line reader for `PeerStream` and apply read timeout from config.
    pub fn with_config_peer(inner: PeerStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: tictacnet_transport::TransportError) -> FrameError {
    match err {
        tictacnet_transport::TransportError::Io(io)
        | tictacnet_transport::TransportError::Accept(io) => FrameError::Io(io),
        tictacnet_transport::TransportError::Bind { source, .. }
        | tictacnet_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
