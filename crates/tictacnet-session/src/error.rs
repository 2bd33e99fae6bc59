use tictacnet_frame::Symbol;

use crate::board::Outcome;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] tictacnet_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] tictacnet_frame::FrameError),

    /// The session configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A reset was requested while no game is running.
    #[error("no game in progress")]
    NotInGame,

    /// The opponent has not asked for a reset.
    #[error("no reset request to answer")]
    NoResetRequested,

    /// The session has already ended.
    #[error("session terminated")]
    Terminated,

    /// The receive thread could not be started.
    #[error("failed to spawn receive thread: {0}")]
    Spawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Why a local move was refused. Rejected moves never reach the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    /// No game has started yet.
    #[error("the game has not started")]
    NotStarted,

    /// It is the other player's turn.
    #[error("not your turn ({active} to move)")]
    NotYourTurn { active: Symbol },

    /// The cell already holds a mark.
    #[error("cell ({row}, {col}) is already taken")]
    Occupied { row: u8, col: u8 },

    /// The coordinates are off the board.
    #[error("cell ({row}, {col}) is off the board")]
    OutOfBounds { row: u8, col: u8 },

    /// The game is already decided.
    #[error("the game is over ({0})")]
    GameOver(Outcome),

    /// A reset request is waiting for an answer.
    #[error("a reset is pending")]
    ResetPending,

    /// The session has ended.
    #[error("the session has ended")]
    Terminated,
}
