use tictacnet_frame::Symbol;

use crate::board::Board;
use crate::error::{MoveRejection, SessionError};
use crate::state::{EndReason, SessionState, TurnColors};

/// Callbacks from a [`Session`](crate::Session) to the embedding UI.
///
/// All callbacks run on the thread that owns the session. Every method has
/// a no-op default so an embedder only implements what it shows.
pub trait SessionObserver {
    fn on_state_changed(&mut self, _state: &SessionState) {}

    fn on_board_changed(&mut self, _board: &Board) {}

    /// A new game began with these colors; `first_turn` moves first.
    fn on_game_started(&mut self, _first_turn: Symbol, _colors: &TurnColors) {}

    /// The opponent asked for a reset; answer with
    /// [`accept_reset`](crate::Session::accept_reset) or
    /// [`reject_reset`](crate::Session::reject_reset).
    fn on_reset_prompt(&mut self) {}

    /// The opponent refused our reset request.
    fn on_reset_rejected(&mut self) {}

    /// Fired exactly once per session.
    fn on_session_ended(&mut self, _reason: &EndReason) {}

    /// A move posted through the dispatch queue was refused.
    fn on_move_rejected(&mut self, _rejection: &MoveRejection) {}

    /// A reset command posted through the dispatch queue was refused.
    fn on_command_rejected(&mut self, _error: &SessionError) {}

    /// A message could not be written. The connection stays open.
    fn on_send_failed(&mut self, _error: &SessionError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}
