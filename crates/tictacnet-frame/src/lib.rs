//! Newline-delimited framing and the typed tictacnet wire protocol.
//!
//! Two layers live here:
//! - line framing: [`LineReader`] / [`LineWriter`] turn a byte stream into
//!   whole UTF-8 lines, whatever the read boundaries
//! - message codec: [`Message`] encodes/decodes the `|`-separated commands
//!   carried in those lines
//!
//! Framing errors ([`FrameError`]) and decode errors ([`DecodeError`]) are
//! kept apart so the session can drop a bad line without touching the
//! connection.

pub mod codec;
pub mod error;
pub mod message;
pub mod reader;
pub mod writer;

pub use codec::{decode_line, encode_line, FrameConfig, DEFAULT_IO_TIMEOUT, DEFAULT_MAX_LINE};
pub use error::{DecodeError, FrameError, Result};
pub use message::{
    Color, Message, Symbol, MAX_COLOR_LEN, MAX_COORD, MAX_MESSAGE_LEN, TAG_MOVE,
    TAG_RESET_ACCEPT, TAG_RESET_REJECT, TAG_RESET_REQUEST, TAG_START,
};
pub use reader::LineReader;
pub use writer::LineWriter;
