//! Two-peer tic-tac-toe session over one TCP connection.
//!
//! This is the "just works" layer. Host or join, then hand the [`Link`] to a
//! [`SessionDriver`] which runs the receive thread and feeds every event, in
//! order, to a single-owner [`Session`] state machine.
//!
//! The state machine itself has no I/O of its own and can be driven directly
//! (see [`Session`], [`Outbound`] and [`SessionObserver`]).

pub mod board;
pub mod config;
pub mod connector;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod lifecycle;
pub mod link;
pub mod listener;
pub mod observer;
pub mod receiver;
pub mod sender;
pub mod session;
pub mod state;

pub use board::{evaluate_board, Board, Outcome};
pub use config::{
    default_palette, SessionConfig, DEFAULT_ACCEPT_POLL_INTERVAL, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_PALETTE,
};
pub use connector::join;
pub use dispatch::{Dispatcher, LocalCommand, SessionEvent};
pub use driver::SessionDriver;
pub use error::{MoveRejection, Result, SessionError};
pub use lifecycle::StopFlag;
pub use link::Link;
pub use listener::SessionListener;
pub use observer::{NoopObserver, SessionObserver};
pub use receiver::{receive_loop, spawn_receive_loop};
pub use sender::{Outbound, StreamSender};
pub use session::Session;
pub use state::{EndReason, PeerRole, ResetInitiator, SessionState, TurnColors};
