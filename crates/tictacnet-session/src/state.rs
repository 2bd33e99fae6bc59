use std::fmt;

use serde::Serialize;
use tictacnet_frame::{Color, Symbol};

use crate::board::Outcome;

/// Which end of the connection this process is. Fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerRole {
    Host,
    Client,
}

impl PeerRole {
    /// The host always plays X, the client always O.
    pub fn local_symbol(self) -> Symbol {
        match self {
            PeerRole::Host => Symbol::X,
            PeerRole::Client => Symbol::O,
        }
    }

    pub fn remote_symbol(self) -> Symbol {
        self.local_symbol().other()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PeerRole::Host => "host",
            PeerRole::Client => "client",
        }
    }
}

impl fmt::Display for PeerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side asked for the pending reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetInitiator {
    Local,
    Remote,
}

/// Observable state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No peer yet.
    Connecting,
    /// Connected, waiting for the host's `START`.
    AwaitingStart,
    /// A game is running and `active` moves next.
    InTurn { active: Symbol },
    /// The last game is decided.
    GameOver { outcome: Outcome },
    /// A reset request is waiting for an answer.
    ResetPending {
        initiator: ResetInitiator,
        local_requested: bool,
        remote_requested: bool,
    },
    /// The session has ended; nothing further happens.
    Terminated,
}

impl SessionState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Connecting => f.write_str("connecting"),
            SessionState::AwaitingStart => f.write_str("waiting for the host to start"),
            SessionState::InTurn { active } => write!(f, "{active} to move"),
            SessionState::GameOver { outcome } => write!(f, "game over: {outcome}"),
            SessionState::ResetPending {
                initiator: ResetInitiator::Local,
                ..
            } => f.write_str("reset requested, waiting for opponent"),
            SessionState::ResetPending {
                initiator: ResetInitiator::Remote,
                ..
            } => f.write_str("opponent requested a reset"),
            SessionState::Terminated => f.write_str("session ended"),
        }
    }
}

/// Display colors for the current game, chosen by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnColors {
    pub x: Color,
    pub o: Color,
}

impl TurnColors {
    pub fn for_symbol(&self, symbol: Symbol) -> &Color {
        match symbol {
            Symbol::X => &self.x,
            Symbol::O => &self.o,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum EndReason {
    /// The connection closed or failed on the opponent's side.
    PeerDisconnected(String),
    /// The local player quit.
    LocalExit,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::PeerDisconnected(detail) => write!(f, "opponent disconnected ({detail})"),
            EndReason::LocalExit => f.write_str("left the game"),
        }
    }
}
