/// Errors that can occur while reading or writing lines.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A line grew past the configured maximum without a terminating `\n`.
    #[error("line too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },

    /// An outgoing line contained a `\n`, which would split it on the wire.
    #[error("line contains an embedded newline")]
    EmbeddedNewline,

    /// A complete line was not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    /// An I/O error occurred while reading or writing lines.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Whether the stream is still usable after this error.
    ///
    /// Recoverable errors mean one line was dropped; the next
    /// [`read_line`](crate::LineReader::read_line) starts at the following line.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::LineTooLong { .. } | FrameError::InvalidUtf8)
    }

    /// Whether this is a read/write timeout rather than a failure.
    pub fn is_timeout(&self) -> bool {
        match self {
            FrameError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// Reasons a line could not be decoded into a [`Message`](crate::Message).
///
/// A decode error never closes the connection; the line is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The line was empty.
    #[error("empty line")]
    Empty,

    /// A known command is missing one of its fields.
    #[error("{tag}: missing field '{field}'")]
    MissingField {
        tag: &'static str,
        field: &'static str,
    },

    /// The symbol field was neither `X` nor `O`.
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    /// A numeric field did not parse.
    #[error("invalid number for '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    /// A board coordinate was outside `0..=2`.
    #[error("'{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: u32 },

    /// A color field was empty, too long, or contained a delimiter.
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    /// Both symbols were given the same color.
    #[error("colors for X and O must differ")]
    IndistinctColors,
}
