//! Peer-to-peer tic-tac-toe over a single TCP connection.
//!
//! # Crate Structure
//!
//! - [`transport`] — TCP host listener, client connect, address discovery
//! - [`frame`] — Newline line framing and the typed wire protocol
//! - [`session`] — Board, game/session state machine, reset handshake,
//!   receive thread and driver

/// Re-export transport types.
pub mod transport {
    pub use tictacnet_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use tictacnet_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use tictacnet_session::*;
}
