use std::time::Duration;

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Line terminator on the wire.
pub const DELIMITER: u8 = b'\n';

/// Default maximum line length in bytes, excluding the terminator.
///
/// The longest legal message is a `START` line with two maximal colors,
/// well under this.
pub const DEFAULT_MAX_LINE: usize = 1024;

/// Default read/write timeout on the data socket.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Encode one line into the wire format (`<line>\n`).
pub fn encode_line(line: &str, dst: &mut BytesMut) -> Result<()> {
    if line.as_bytes().contains(&DELIMITER) {
        return Err(FrameError::EmbeddedNewline);
    }
    dst.reserve(line.len() + 1);
    dst.put_slice(line.as_bytes());
    dst.put_u8(DELIMITER);
    Ok(())
}

/// Split one complete line off the front of `src`.
///
/// Returns `Ok(None)` if no terminator has arrived yet. On success the line
/// and its terminator are consumed and trailing whitespace (including a `\r`)
/// is stripped. A line longer than `max_line` or not valid UTF-8 is still
/// consumed, so the caller can drop it and continue with the next one.
pub fn decode_line(src: &mut BytesMut, max_line: usize) -> Result<Option<String>> {
    let Some(pos) = src.iter().position(|&b| b == DELIMITER) else {
        return Ok(None);
    };

    let mut raw = src.split_to(pos + 1);
    raw.truncate(pos);

    if raw.len() > max_line {
        return Err(FrameError::LineTooLong {
            size: raw.len(),
            max: max_line,
        });
    }

    let text = std::str::from_utf8(&raw).map_err(|_| FrameError::InvalidUtf8)?;
    Ok(Some(text.trim_end().to_string()))
}

/// Configuration for line framing on a peer stream.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum line length in bytes. Default: 1024.
    pub max_line_len: usize,
    /// Read timeout for blocking reads. The receive loop uses it as its
    /// stop-flag polling interval.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking writes.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE,
            read_timeout: Some(DEFAULT_IO_TIMEOUT),
            write_timeout: Some(DEFAULT_IO_TIMEOUT),
        }
    }
}
