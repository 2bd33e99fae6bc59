//! TCP transport for tictacnet sessions.
//!
//! A session is exactly two peers on one TCP stream:
//! - the host binds, waits for a single opponent, then closes its listener
//! - the client connects with a bounded timeout
//!
//! This is the lowest layer of tictacnet. Everything else builds on top of
//! the [`PeerStream`] type provided here.

pub mod discovery;
pub mod error;
pub mod stream;
pub mod tcp;

pub use discovery::{allocate_listen_port, detect_local_address};
pub use error::{Result, TransportError};
pub use stream::PeerStream;
pub use tcp::{connect, HostListener};
