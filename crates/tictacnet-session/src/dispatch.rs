//! The ordered event queue between producer threads and the session owner.
//!
//! Network messages (from the receive loop) and local commands (from a UI
//! thread or signal handler) go through the same FIFO, so the session sees
//! one total order of events and never needs a lock.

use std::sync::mpsc::{self, Receiver, Sender};

use tictacnet_frame::Message;
use tracing::trace;

/// A local player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Play { row: u8, col: u8 },
    RequestReset,
    AcceptReset,
    RejectReset,
    Exit,
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A decoded message from the peer, in wire order.
    Remote(Message),
    /// The connection closed or failed.
    PeerDisconnected(String),
    Local(LocalCommand),
}

/// Producer handle for the session event queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: Sender<SessionEvent>,
}

impl Dispatcher {
    /// Queue an event. Returns `false` if the session owner is gone.
    pub fn post(&self, event: SessionEvent) -> bool {
        trace!(?event, "dispatch");
        self.tx.send(event).is_ok()
    }

    /// Queue a local command.
    pub fn command(&self, command: LocalCommand) -> bool {
        self.post(SessionEvent::Local(command))
    }
}

/// Create a queue: the dispatcher for producers, the receiver for the owner.
pub fn channel() -> (Dispatcher, Receiver<SessionEvent>) {
    let (tx, rx) = mpsc::channel();
    (Dispatcher { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_post_order() {
        let (dispatcher, rx) = channel();
        let remote = dispatcher.clone();

        assert!(remote.post(SessionEvent::Remote(Message::ResetRequest)));
        assert!(dispatcher.command(LocalCommand::AcceptReset));
        assert!(remote.post(SessionEvent::PeerDisconnected("eof".to_string())));

        assert_eq!(
            rx.recv().unwrap(),
            SessionEvent::Remote(Message::ResetRequest)
        );
        assert_eq!(
            rx.recv().unwrap(),
            SessionEvent::Local(LocalCommand::AcceptReset)
        );
        assert_eq!(
            rx.recv().unwrap(),
            SessionEvent::PeerDisconnected("eof".to_string())
        );
    }

    #[test]
    fn post_fails_once_owner_is_gone() {
        let (dispatcher, rx) = channel();
        drop(rx);
        assert!(!dispatcher.command(LocalCommand::Exit));
    }
}
