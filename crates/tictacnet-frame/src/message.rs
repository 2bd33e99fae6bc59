//! The typed wire protocol.
//!
//! Every message is one line of `|`-separated fields, the first of which is
//! the command tag:
//!
//! ```text
//! START|<X or O>|<colorX>|<colorO>     host -> client
//! MOVE|<row 0-2>|<col 0-2>             either
//! RESET_REQUEST                        either
//! RESET_ACCEPT                         either
//! RESET_REJECT                         either
//! ```
//!
//! Unknown tags decode to [`Message::Unknown`] instead of failing, and extra
//! trailing fields on known tags are ignored, so a newer peer can talk to an
//! older one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Field separator.
pub const SEPARATOR: char = '|';

/// Tag: first-turn symbol and colors for a new game.
pub const TAG_START: &str = "START";
/// Tag: a mark was placed by the sender.
pub const TAG_MOVE: &str = "MOVE";
/// Tag: ask to abandon the current game and restart.
pub const TAG_RESET_REQUEST: &str = "RESET_REQUEST";
/// Tag: agree to reset.
pub const TAG_RESET_ACCEPT: &str = "RESET_ACCEPT";
/// Tag: refuse to reset.
pub const TAG_RESET_REJECT: &str = "RESET_REJECT";

/// Largest board coordinate.
pub const MAX_COORD: u8 = 2;
/// Maximum color string length in bytes.
pub const MAX_COLOR_LEN: usize = 64;
/// Longest encoded message: a `START` carrying two maximal colors.
pub const MAX_MESSAGE_LEN: usize = TAG_START.len() + 3 + MAX_COLOR_LEN + 1 + MAX_COLOR_LEN;

/// A player's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The opponent's symbol.
    pub fn other(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::X => "X",
            Symbol::O => "O",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(Symbol::X),
            "O" => Ok(Symbol::O),
            other => Err(DecodeError::InvalidSymbol(other.to_string())),
        }
    }
}

/// A display color, carried verbatim on the wire (e.g. `#E74C3C`).
///
/// Guaranteed non-empty, at most [`MAX_COLOR_LEN`] bytes, without surrounding
/// whitespace, and free of the field separator and line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Validate and wrap a color string.
    pub fn new(value: impl Into<String>) -> Result<Self, DecodeError> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.trim() == value
            && value.len() <= MAX_COLOR_LEN
            && !value.contains(|c| c == SEPARATOR || c == '\n' || c == '\r');
        if valid {
            Ok(Self(value))
        } else {
            Err(DecodeError::InvalidColor(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::new(value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A new game: who moves first and the color of each symbol.
    Start {
        first_turn: Symbol,
        color_x: Color,
        color_o: Color,
    },
    /// The sender placed its mark at `(row, col)`.
    Move { row: u8, col: u8 },
    ResetRequest,
    ResetAccept,
    ResetReject,
    /// A tag this version does not understand.
    Unknown { tag: String },
}

impl Message {
    /// The command tag this message is sent under.
    pub fn tag(&self) -> &str {
        match self {
            Message::Start { .. } => TAG_START,
            Message::Move { .. } => TAG_MOVE,
            Message::ResetRequest => TAG_RESET_REQUEST,
            Message::ResetAccept => TAG_RESET_ACCEPT,
            Message::ResetReject => TAG_RESET_REJECT,
            Message::Unknown { tag } => tag,
        }
    }

    /// Encode into one wire line, without the terminator.
    pub fn encode(&self) -> String {
        match self {
            Message::Start {
                first_turn,
                color_x,
                color_o,
            } => format!("{TAG_START}|{first_turn}|{color_x}|{color_o}"),
            Message::Move { row, col } => format!("{TAG_MOVE}|{row}|{col}"),
            other => other.tag().to_string(),
        }
    }

    /// Decode one wire line (terminator already stripped).
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        if line.is_empty() {
            return Err(DecodeError::Empty);
        }

        let mut fields = line.split(SEPARATOR);
        let tag = fields.next().unwrap_or_default();

        match tag {
            TAG_START => {
                let first_turn: Symbol = required(&mut fields, TAG_START, "first_turn")?.parse()?;
                let color_x = Color::new(required(&mut fields, TAG_START, "color_x")?)?;
                let color_o = Color::new(required(&mut fields, TAG_START, "color_o")?)?;
                if color_x == color_o {
                    return Err(DecodeError::IndistinctColors);
                }
                Ok(Message::Start {
                    first_turn,
                    color_x,
                    color_o,
                })
            }
            TAG_MOVE => {
                let row = parse_coord(required(&mut fields, TAG_MOVE, "row")?, "row")?;
                let col = parse_coord(required(&mut fields, TAG_MOVE, "col")?, "col")?;
                Ok(Message::Move { row, col })
            }
            TAG_RESET_REQUEST => Ok(Message::ResetRequest),
            TAG_RESET_ACCEPT => Ok(Message::ResetAccept),
            TAG_RESET_REJECT => Ok(Message::ResetReject),
            other => Ok(Message::Unknown {
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn required<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    tag: &'static str,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    fields.next().ok_or(DecodeError::MissingField { tag, field })
}

fn parse_coord(value: &str, field: &'static str) -> Result<u8, DecodeError> {
    let parsed: u32 = value.parse().map_err(|_| DecodeError::InvalidNumber {
        field,
        value: value.to_string(),
    })?;
    if parsed > u32::from(MAX_COORD) {
        return Err(DecodeError::OutOfRange {
            field,
            value: parsed,
        });
    }
    Ok(parsed as u8)
}
