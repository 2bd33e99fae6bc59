use std::net::SocketAddr;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::dispatch::{self, Dispatcher, LocalCommand, SessionEvent};
use crate::error::Result;
use crate::lifecycle::StopFlag;
use crate::link::Link;
use crate::observer::SessionObserver;
use crate::receiver::spawn_receive_loop;
use crate::sender::StreamSender;
use crate::session::Session;
use crate::state::{EndReason, PeerRole};

/// Owns a connected [`Session`], its receive thread, and its event queue.
///
/// All session mutation happens on the thread that calls [`run`](Self::run),
/// [`pump`](Self::pump) or [`step`](Self::step). Other threads talk to the
/// session only through [`Dispatcher`] handles.
pub struct SessionDriver<V: SessionObserver> {
    session: Session<StreamSender, V>,
    events: Receiver<SessionEvent>,
    dispatcher: Dispatcher,
    stop: StopFlag,
    receiver: Option<JoinHandle<()>>,
    peer_addr: SocketAddr,
}

impl<V: SessionObserver> SessionDriver<V> {
    /// Start the receive thread and mark the session connected.
    ///
    /// The host sends the first `START` before this returns.
    pub fn start(role: PeerRole, link: Link, config: &SessionConfig, observer: V) -> Result<Self> {
        let peer_addr = link.peer_addr();
        let (reader, sender) = link.into_parts();
        let mut session = Session::new(role, config, sender, observer)?;

        let (dispatcher, events) = dispatch::channel();
        let stop = StopFlag::new();
        let receiver = spawn_receive_loop(reader, stop.clone(), dispatcher.clone())?;

        session.on_connected();

        Ok(Self {
            session,
            events,
            dispatcher,
            stop,
            receiver: Some(receiver),
            peer_addr,
        })
    }

    /// A handle for posting local commands from other threads.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn session(&self) -> &Session<StreamSender, V> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<StreamSender, V> {
        &mut self.session
    }

    /// Process events until the session ends.
    pub fn run(&mut self) -> EndReason {
        while !self.session.is_terminated() {
            match self.events.recv() {
                Ok(event) => self.apply(event),
                // unreachable while `self.dispatcher` is alive
                Err(_) => self.session.handle_disconnect("event queue closed"),
            }
        }
        self.finish();
        self.end_reason()
    }

    /// Process every event already queued without blocking.
    ///
    /// Returns `false` once the session has ended.
    pub fn pump(&mut self) -> bool {
        while !self.session.is_terminated() {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.session.handle_disconnect("event queue closed")
                }
            }
        }
        self.after_event()
    }

    /// Wait up to `timeout` for one event and process it.
    ///
    /// Returns `false` once the session has ended.
    pub fn step(&mut self, timeout: Duration) -> bool {
        if !self.session.is_terminated() {
            match self.events.recv_timeout(timeout) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.session.handle_disconnect("event queue closed")
                }
            }
        }
        self.after_event()
    }

    /// End the session locally and release the socket and receive thread.
    pub fn shutdown(&mut self) {
        self.stop.stop();
        self.session.exit();
        self.finish();
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Remote(message) => self.session.handle_message(message),
            SessionEvent::PeerDisconnected(detail) => self.session.handle_disconnect(detail),
            SessionEvent::Local(command) => self.apply_command(command),
        }
    }

    fn apply_command(&mut self, command: LocalCommand) {
        let result = match command {
            LocalCommand::Play { row, col } => {
                if let Err(rejection) = self.session.play(row, col) {
                    debug!(row, col, %rejection, "move rejected");
                    self.session.observer_mut().on_move_rejected(&rejection);
                }
                return;
            }
            LocalCommand::RequestReset => self.session.request_reset(),
            LocalCommand::AcceptReset => self.session.accept_reset(),
            LocalCommand::RejectReset => self.session.reject_reset(),
            LocalCommand::Exit => {
                self.stop.stop();
                self.session.exit();
                return;
            }
        };

        if let Err(err) = result {
            debug!(?command, error = %err, "command rejected");
            self.session.observer_mut().on_command_rejected(&err);
        }
    }

    fn after_event(&mut self) -> bool {
        if self.session.is_terminated() {
            self.finish();
            false
        } else {
            true
        }
    }

    fn finish(&mut self) {
        self.stop.stop();
        if let Some(handle) = self.receiver.take() {
            if handle.join().is_err() {
                warn!("receive thread panicked");
            }
        }
    }

    fn end_reason(&self) -> EndReason {
        self.session
            .end_reason()
            .cloned()
            .unwrap_or(EndReason::LocalExit)
    }
}

impl<V: SessionObserver> Drop for SessionDriver<V> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
