use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tictacnet_frame::{Color, Message, Symbol};
use tracing::{debug, info, trace, warn};

use crate::board::{evaluate_board, Board, Outcome};
use crate::config::SessionConfig;
use crate::error::{MoveRejection, Result, SessionError};
use crate::observer::SessionObserver;
use crate::sender::Outbound;
use crate::state::{EndReason, PeerRole, ResetInitiator, SessionState, TurnColors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Connecting,
    AwaitingStart,
    Playing {
        active: Symbol,
        outcome: Option<Outcome>,
    },
    Terminated,
}

/// The host's colors, deduplicated. Always holds at least two.
#[derive(Debug, Clone)]
struct Palette(Vec<Color>);

impl Palette {
    fn new(colors: &[Color]) -> Result<Self> {
        let mut distinct: Vec<Color> = Vec::with_capacity(colors.len());
        for color in colors {
            if !distinct.contains(color) {
                distinct.push(color.clone());
            }
        }
        if distinct.len() < 2 {
            return Err(SessionError::InvalidConfig(
                "palette needs at least two distinct colors".to_string(),
            ));
        }
        Ok(Self(distinct))
    }

    /// Two different colors, uniformly at random.
    fn draw(&self, rng: &mut StdRng) -> TurnColors {
        let len = self.0.len();
        let x = rng.gen_range(0..len);
        let mut o = rng.gen_range(0..len - 1);
        if o >= x {
            o += 1;
        }
        TurnColors {
            x: self.0[x].clone(),
            o: self.0[o].clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PendingReset {
    local_requested: bool,
    remote_requested: bool,
}

impl PendingReset {
    fn any(self) -> bool {
        self.local_requested || self.remote_requested
    }
}

/// The game state machine for one side of a connection.
///
/// A session is driven from a single thread: network messages arrive through
/// [`handle_message`](Self::handle_message), local actions through
/// [`play`](Self::play) and the reset methods. It never reads from the
/// network itself, and writes only through its [`Outbound`].
pub struct Session<O, V> {
    role: PeerRole,
    board: Board,
    phase: Phase,
    pending: PendingReset,
    colors: Option<TurnColors>,
    palette: Palette,
    rng: StdRng,
    end_reason: Option<EndReason>,
    outbound: O,
    observer: V,
}

impl<O: Outbound, V: SessionObserver> Session<O, V> {
    /// Create a session in `Connecting`.
    pub fn new(role: PeerRole, config: &SessionConfig, outbound: O, observer: V) -> Result<Self> {
        config.validate()?;

        let palette = Palette::new(&config.palette)?;

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            role,
            board: Board::new(),
            phase: Phase::Connecting,
            pending: PendingReset::default(),
            colors: None,
            palette,
            rng,
            end_reason: None,
            outbound,
            observer,
        })
    }

    /// The connection is up. The host starts the first game immediately.
    pub fn on_connected(&mut self) {
        if self.phase != Phase::Connecting {
            debug!(role = %self.role, "ignoring duplicate connect notification");
            return;
        }

        info!(role = %self.role, "peer connected");
        self.phase = Phase::AwaitingStart;
        self.notify_state();

        if self.role == PeerRole::Host {
            self.start_new_game();
        }
    }

    /// Apply one message received from the peer.
    pub fn handle_message(&mut self, message: Message) {
        if self.phase == Phase::Terminated {
            trace!(tag = message.tag(), "session terminated, dropping message");
            return;
        }
        debug!(role = %self.role, message = %message, "received");

        match message {
            Message::Start {
                first_turn,
                color_x,
                color_o,
            } => self.on_start(first_turn, TurnColors { x: color_x, o: color_o }),
            Message::Move { row, col } => self.on_remote_move(row, col),
            Message::ResetRequest => self.on_reset_request(),
            Message::ResetAccept => self.on_reset_accept(),
            Message::ResetReject => self.on_reset_reject(),
            Message::Unknown { tag } => debug!(tag = %tag, "ignoring unknown message"),
        }
    }

    /// The connection dropped or failed.
    pub fn handle_disconnect(&mut self, detail: impl Into<String>) {
        self.terminate(EndReason::PeerDisconnected(detail.into()));
    }

    /// The local player leaves.
    pub fn exit(&mut self) {
        self.terminate(EndReason::LocalExit);
    }

    /// Place the local player's mark and notify the peer.
    ///
    /// Returns the outcome if this move ended the game. A rejected move
    /// changes nothing and sends nothing.
    pub fn play(&mut self, row: u8, col: u8) -> std::result::Result<Option<Outcome>, MoveRejection> {
        let active = match self.phase {
            Phase::Terminated => return Err(MoveRejection::Terminated),
            Phase::Connecting | Phase::AwaitingStart => return Err(MoveRejection::NotStarted),
            Phase::Playing {
                outcome: Some(outcome),
                ..
            } => return Err(MoveRejection::GameOver(outcome)),
            Phase::Playing {
                active,
                outcome: None,
            } => active,
        };
        if self.pending.any() {
            return Err(MoveRejection::ResetPending);
        }
        let symbol = self.role.local_symbol();
        if active != symbol {
            return Err(MoveRejection::NotYourTurn { active });
        }

        self.board.place_mark(row, col, symbol)?;
        let outcome = self.advance_turn(symbol);
        debug!(row, col, symbol = %symbol, "local move");

        self.transmit(&Message::Move { row, col });
        self.notify_board();
        self.notify_state();
        Ok(outcome)
    }

    /// Ask to restart the game.
    ///
    /// If the opponent has already asked, this accepts their request instead.
    /// A second request while ours is outstanding does nothing.
    pub fn request_reset(&mut self) -> Result<()> {
        self.ensure_in_game()?;

        if self.pending.remote_requested {
            info!("both sides asked for a reset, accepting");
            self.transmit(&Message::ResetAccept);
            self.perform_reset();
        } else if !self.pending.local_requested {
            info!("requesting reset");
            self.pending.local_requested = true;
            self.transmit(&Message::ResetRequest);
            self.notify_state();
        }
        Ok(())
    }

    /// Agree to the opponent's reset request.
    pub fn accept_reset(&mut self) -> Result<()> {
        self.ensure_remote_request()?;
        info!("accepting reset");
        self.transmit(&Message::ResetAccept);
        self.perform_reset();
        Ok(())
    }

    /// Refuse the opponent's reset request. The game continues unchanged.
    pub fn reject_reset(&mut self) -> Result<()> {
        self.ensure_remote_request()?;
        info!("rejecting reset");
        self.pending.remote_requested = false;
        self.transmit(&Message::ResetReject);
        self.notify_state();
        Ok(())
    }

    /// Current observable state.
    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Connecting => SessionState::Connecting,
            Phase::AwaitingStart => SessionState::AwaitingStart,
            Phase::Terminated => SessionState::Terminated,
            Phase::Playing { .. } if self.pending.any() => SessionState::ResetPending {
                initiator: if self.pending.local_requested {
                    ResetInitiator::Local
                } else {
                    ResetInitiator::Remote
                },
                local_requested: self.pending.local_requested,
                remote_requested: self.pending.remote_requested,
            },
            Phase::Playing {
                outcome: Some(outcome),
                ..
            } => SessionState::GameOver { outcome },
            Phase::Playing { active, .. } => SessionState::InTurn { active },
        }
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn local_symbol(&self) -> Symbol {
        self.role.local_symbol()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Colors of the current game, once known.
    pub fn colors(&self) -> Option<&TurnColors> {
        self.colors.as_ref()
    }

    /// The symbol to move next, while a game is undecided.
    pub fn active_symbol(&self) -> Option<Symbol> {
        match self.phase {
            Phase::Playing {
                active,
                outcome: None,
            } => Some(active),
            _ => None,
        }
    }

    /// Outcome of the current game, once decided.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Playing { outcome, .. } => outcome,
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Why the session ended, once it has.
    pub fn end_reason(&self) -> Option<&EndReason> {
        self.end_reason.as_ref()
    }

    pub fn observer(&self) -> &V {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut V {
        &mut self.observer
    }

    pub fn outbound(&self) -> &O {
        &self.outbound
    }

    pub fn outbound_mut(&mut self) -> &mut O {
        &mut self.outbound
    }

    fn on_start(&mut self, first_turn: Symbol, colors: TurnColors) {
        if self.role == PeerRole::Host {
            warn!("host received START, ignoring");
            return;
        }

        info!(first = %first_turn, x = %colors.x, o = %colors.o, "new game");
        self.board.clear();
        self.pending = PendingReset::default();
        self.observer.on_game_started(first_turn, &colors);
        self.colors = Some(colors);
        self.phase = Phase::Playing {
            active: first_turn,
            outcome: None,
        };
        self.notify_board();
        self.notify_state();
    }

    fn on_remote_move(&mut self, row: u8, col: u8) {
        let symbol = self.role.remote_symbol();
        match self.phase {
            Phase::Playing {
                active,
                outcome: None,
            } if active == symbol => {}
            _ => {
                warn!(row, col, state = %self.state(), "dropping out-of-turn move");
                return;
            }
        }

        if let Err(rejection) = self.board.place_mark(row, col, symbol) {
            warn!(row, col, %rejection, "dropping illegal move");
            return;
        }
        self.advance_turn(symbol);
        debug!(row, col, symbol = %symbol, "remote move");

        self.notify_board();
        self.notify_state();
    }

    fn on_reset_request(&mut self) {
        if !self.in_game() {
            warn!(state = %self.state(), "reset request outside a game, ignoring");
            return;
        }

        if self.pending.local_requested {
            info!("reset requested by both sides, accepting");
            self.transmit(&Message::ResetAccept);
            self.perform_reset();
        } else if !self.pending.remote_requested {
            info!("opponent requested reset");
            self.pending.remote_requested = true;
            self.notify_state();
            self.observer.on_reset_prompt();
        }
    }

    fn on_reset_accept(&mut self) {
        if !self.pending.local_requested {
            debug!("stale reset accept, ignoring");
            return;
        }
        info!("opponent accepted reset");
        self.perform_reset();
    }

    fn on_reset_reject(&mut self) {
        if !self.pending.local_requested {
            debug!("reset reject without a request, ignoring");
            return;
        }
        info!("opponent rejected reset");
        self.pending.local_requested = false;
        self.notify_state();
        self.observer.on_reset_rejected();
    }

    /// Host only: new board, fresh turn and colors, then `START`.
    fn start_new_game(&mut self) {
        let first_turn = if self.rng.gen_bool(0.5) {
            Symbol::X
        } else {
            Symbol::O
        };
        let colors = self.palette.draw(&mut self.rng);

        info!(first = %first_turn, x = %colors.x, o = %colors.o, "starting new game");
        self.board.clear();
        self.pending = PendingReset::default();
        self.phase = Phase::Playing {
            active: first_turn,
            outcome: None,
        };
        self.transmit(&Message::Start {
            first_turn,
            color_x: colors.x.clone(),
            color_o: colors.o.clone(),
        });
        self.observer.on_game_started(first_turn, &colors);
        self.colors = Some(colors);
        self.notify_board();
        self.notify_state();
    }

    fn perform_reset(&mut self) {
        self.pending = PendingReset::default();
        match self.role {
            PeerRole::Host => self.start_new_game(),
            PeerRole::Client => {
                self.board.clear();
                self.phase = Phase::AwaitingStart;
                self.notify_board();
                self.notify_state();
            }
        }
    }

    /// Record a mark by `symbol` and move the game on.
    fn advance_turn(&mut self, symbol: Symbol) -> Option<Outcome> {
        let outcome = evaluate_board(&self.board, symbol);
        if let Some(outcome) = outcome {
            info!(%outcome, "game over");
        }
        self.phase = Phase::Playing {
            active: symbol.other(),
            outcome,
        };
        outcome
    }

    fn terminate(&mut self, reason: EndReason) {
        if self.phase == Phase::Terminated {
            return;
        }

        info!(role = %self.role, %reason, "session ended");
        self.phase = Phase::Terminated;
        self.pending = PendingReset::default();
        self.outbound.close();
        self.notify_state();
        self.observer.on_session_ended(&reason);
        self.end_reason = Some(reason);
    }

    fn transmit(&mut self, message: &Message) {
        if let Err(err) = self.outbound.send(message) {
            warn!(tag = message.tag(), error = %err, "send failed");
            self.observer.on_send_failed(&err);
        }
    }

    fn in_game(&self) -> bool {
        matches!(self.phase, Phase::Playing { .. })
    }

    fn ensure_in_game(&self) -> Result<()> {
        match self.phase {
            Phase::Terminated => Err(SessionError::Terminated),
            Phase::Playing { .. } => Ok(()),
            Phase::Connecting | Phase::AwaitingStart => Err(SessionError::NotInGame),
        }
    }

    fn ensure_remote_request(&self) -> Result<()> {
        if self.phase == Phase::Terminated {
            return Err(SessionError::Terminated);
        }
        if !self.pending.remote_requested {
            return Err(SessionError::NoResetRequested);
        }
        Ok(())
    }

    fn notify_state(&mut self) {
        let state = self.state();
        self.observer.on_state_changed(&state);
    }

    fn notify_board(&mut self) {
        self.observer.on_board_changed(&self.board);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Default)]
    struct Wire {
        sent: VecDeque<Message>,
        closed: usize,
        fail_sends: bool,
    }

    impl Outbound for Wire {
        fn send(&mut self, message: &Message) -> Result<()> {
            if self.fail_sends {
                return Err(SessionError::Frame(tictacnet_frame::FrameError::ConnectionClosed));
            }
            self.sent.push_back(message.clone());
            Ok(())
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Started(Symbol),
        State(SessionState),
        Board(Board),
        Prompt,
        Rejected,
        Ended(EndReason),
        SendFailed,
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Seen>,
    }

    impl Recorder {
        fn count(&self, f: impl Fn(&Seen) -> bool) -> usize {
            self.seen.iter().filter(|s| f(s)).count()
        }
    }

    impl SessionObserver for Recorder {
        fn on_state_changed(&mut self, state: &SessionState) {
            self.seen.push(Seen::State(state.clone()));
        }

        fn on_board_changed(&mut self, board: &Board) {
            self.seen.push(Seen::Board(board.clone()));
        }

        fn on_game_started(&mut self, first_turn: Symbol, _colors: &TurnColors) {
            self.seen.push(Seen::Started(first_turn));
        }

        fn on_reset_prompt(&mut self) {
            self.seen.push(Seen::Prompt);
        }

        fn on_reset_rejected(&mut self) {
            self.seen.push(Seen::Rejected);
        }

        fn on_session_ended(&mut self, reason: &EndReason) {
            self.seen.push(Seen::Ended(reason.clone()));
        }

        fn on_send_failed(&mut self, _error: &SessionError) {
            self.seen.push(Seen::SendFailed);
        }
    }

    type TestSession = Session<Wire, Recorder>;

    fn seeded(seed: u64) -> SessionConfig {
        SessionConfig {
            rng_seed: Some(seed),
            ..SessionConfig::default()
        }
    }

    fn session(role: PeerRole, seed: u64) -> TestSession {
        Session::new(role, &seeded(seed), Wire::default(), Recorder::default()).unwrap()
    }

    /// Deliver everything `from` has sent so far to `to`, in order.
    fn deliver(from: &mut TestSession, to: &mut TestSession) -> usize {
        let mut delivered = 0;
        while let Some(message) = from.outbound_mut().sent.pop_front() {
            to.handle_message(message);
            delivered += 1;
        }
        delivered
    }

    /// Connected host and client with the first game started on both.
    fn connected_pair(seed: u64) -> (TestSession, TestSession) {
        let mut host = session(PeerRole::Host, seed);
        let mut client = session(PeerRole::Client, seed);
        host.on_connected();
        client.on_connected();
        assert_eq!(deliver(&mut host, &mut client), 1);
        (host, client)
    }

    /// Pair where X (the host) moves first.
    fn host_first_pair() -> (TestSession, TestSession) {
        for seed in 0..64 {
            let (host, client) = connected_pair(seed);
            if host.active_symbol() == Some(Symbol::X) {
                return (host, client);
            }
        }
        panic!("no seed gives X the first turn");
    }

    fn mover<'a>(
        host: &'a mut TestSession,
        client: &'a mut TestSession,
    ) -> (&'a mut TestSession, &'a mut TestSession) {
        if host.active_symbol() == Some(host.local_symbol()) {
            (host, client)
        } else {
            (client, host)
        }
    }

    #[test]
    fn host_sends_start_with_distinct_colors() {
        let mut host = session(PeerRole::Host, 7);
        assert_eq!(host.state(), SessionState::Connecting);
        host.on_connected();

        let start = host.outbound().sent.front().cloned().unwrap();
        let Message::Start {
            first_turn,
            color_x,
            color_o,
        } = start
        else {
            panic!("expected START");
        };
        assert_ne!(color_x, color_o);
        assert_eq!(host.state(), SessionState::InTurn { active: first_turn });
        assert_eq!(host.colors().unwrap().x, color_x);
    }

    #[test]
    fn palette_draws_two_different_colors() {
        let red = Color::new("red").unwrap();
        let blue = Color::new("blue").unwrap();
        let palette = Palette::new(&[red.clone(), red.clone(), blue.clone()]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..50 {
            let colors = palette.draw(&mut rng);
            assert_ne!(colors.x, colors.o);
            assert!(colors.x == red || colors.x == blue);
            assert!(colors.o == red || colors.o == blue);
        }

        assert!(matches!(
            Palette::new(&[red.clone(), red]),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn seeded_sessions_draw_the_same_game() {
        let mut a = session(PeerRole::Host, 99);
        let mut b = session(PeerRole::Host, 99);
        a.on_connected();
        b.on_connected();
        assert_eq!(a.outbound().sent, b.outbound().sent);
    }

    #[test]
    fn client_follows_host_start() {
        let mut client = session(PeerRole::Client, 1);
        client.on_connected();
        assert_eq!(client.state(), SessionState::AwaitingStart);
        assert_eq!(client.play(0, 0), Err(MoveRejection::NotStarted));
        assert!(client.outbound().sent.is_empty());

        client.handle_message(Message::Start {
            first_turn: Symbol::O,
            color_x: Color::new("a").unwrap(),
            color_o: Color::new("b").unwrap(),
        });
        assert_eq!(client.state(), SessionState::InTurn { active: Symbol::O });
        assert_eq!(client.active_symbol(), Some(Symbol::O));
        assert_eq!(client.colors().unwrap().o.as_str(), "b");
        assert_eq!(client.play(1, 1), Ok(None));
        assert_eq!(
            client.outbound().sent.back(),
            Some(&Message::Move { row: 1, col: 1 })
        );
    }

    #[test]
    fn host_ignores_start() {
        let (mut host, _client) = connected_pair(3);
        let before = host.state();
        host.handle_message(Message::Start {
            first_turn: Symbol::O,
            color_x: Color::new("a").unwrap(),
            color_o: Color::new("b").unwrap(),
        });
        assert_eq!(host.state(), before);
    }

    #[test]
    fn boards_stay_identical_through_a_game() {
        let (mut host, mut client) = connected_pair(11);
        let script = [(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)];

        for (row, col) in script {
            let (me, peer) = mover(&mut host, &mut client);
            me.play(row, col).unwrap();
            assert_eq!(deliver(me, peer), 1);
            assert_eq!(host.board(), client.board());
        }

        assert!(host.outcome().is_some());
        assert_eq!(host.outcome(), client.outcome());
        assert_eq!(host.board().marks(), 5);
    }

    #[test]
    fn replaying_moves_reproduces_the_board() {
        let (mut host, mut client) = host_first_pair();
        let mut host_moves = Vec::new();
        let mut client_moves = Vec::new();

        let script = [(0, 0), (1, 1), (2, 2), (0, 2), (2, 0), (1, 0)];
        for (i, (row, col)) in script.into_iter().enumerate() {
            let (me, peer, log) = if i % 2 == 0 {
                (&mut host, &mut client, &mut host_moves)
            } else {
                (&mut client, &mut host, &mut client_moves)
            };
            me.play(row, col).unwrap();
            log.extend(me.outbound().sent.iter().cloned());
            deliver(me, peer);
        }

        let mut replay = Board::new();
        for (log, symbol) in [(&host_moves, Symbol::X), (&client_moves, Symbol::O)] {
            for message in log {
                let Message::Move { row, col } = message else {
                    panic!("only moves expected");
                };
                replay.place_mark(*row, *col, symbol).unwrap();
            }
        }

        assert_eq!(&replay, host.board());
        assert_eq!(&replay, client.board());
        assert_eq!(host.outcome(), None);
    }

    #[test]
    fn local_move_rules() {
        let (mut host, mut client) = host_first_pair();

        assert_eq!(
            client.play(0, 0),
            Err(MoveRejection::NotYourTurn { active: Symbol::X })
        );
        assert_eq!(
            host.play(3, 0),
            Err(MoveRejection::OutOfBounds { row: 3, col: 0 })
        );
        host.play(0, 0).unwrap();
        deliver(&mut host, &mut client);

        assert_eq!(
            client.play(0, 0),
            Err(MoveRejection::Occupied { row: 0, col: 0 })
        );
        assert!(client.outbound().sent.is_empty());
        assert_eq!(client.active_symbol(), Some(Symbol::O));
    }

    #[test]
    fn illegal_remote_moves_are_dropped() {
        let (mut host, mut client) = host_first_pair();
        host.play(1, 1).unwrap();
        deliver(&mut host, &mut client);

        // occupied
        host.handle_message(Message::Move { row: 1, col: 1 });
        assert_eq!(host.board().get(1, 1), Some(Symbol::X));
        assert_eq!(host.active_symbol(), Some(Symbol::O));

        // out of turn for the client
        client.handle_message(Message::Move { row: 0, col: 0 });
        assert_eq!(client.board().get(0, 0), None);
        assert_eq!(client.board(), host.board());
    }

    #[test]
    fn win_ends_the_game_on_both_sides() {
        let (mut host, mut client) = host_first_pair();
        for (who, row, col) in [(0, 0, 0), (1, 1, 0), (0, 0, 1), (1, 1, 1), (0, 0, 2)] {
            if who == 0 {
                host.play(row, col).unwrap();
                deliver(&mut host, &mut client);
            } else {
                client.play(row, col).unwrap();
                deliver(&mut client, &mut host);
            }
        }

        assert_eq!(
            host.state(),
            SessionState::GameOver {
                outcome: Outcome::WinnerX
            }
        );
        assert_eq!(host.state(), client.state());
        assert_eq!(
            client.play(2, 2),
            Err(MoveRejection::GameOver(Outcome::WinnerX))
        );
    }

    #[test]
    fn reset_accepted_after_prompt() {
        let (mut host, mut client) = host_first_pair();
        host.play(0, 0).unwrap();
        deliver(&mut host, &mut client);

        client.request_reset().unwrap();
        assert!(matches!(
            client.state(),
            SessionState::ResetPending {
                initiator: ResetInitiator::Local,
                ..
            }
        ));
        assert_eq!(client.play(2, 2), Err(MoveRejection::ResetPending));

        deliver(&mut client, &mut host);
        assert_eq!(host.observer().count(|s| *s == Seen::Prompt), 1);
        assert!(matches!(
            host.state(),
            SessionState::ResetPending {
                initiator: ResetInitiator::Remote,
                remote_requested: true,
                ..
            }
        ));

        host.accept_reset().unwrap();
        let sent: Vec<Message> = host.outbound().sent.iter().cloned().collect();
        assert_eq!(sent[0], Message::ResetAccept);
        assert!(matches!(sent[1], Message::Start { .. }));

        deliver(&mut host, &mut client);
        assert!(host.board().is_empty());
        assert!(client.board().is_empty());
        assert_eq!(host.active_symbol(), client.active_symbol());
        assert!(matches!(client.state(), SessionState::InTurn { .. }));
        assert_eq!(
            client
                .observer()
                .count(|s| matches!(s, Seen::Started(_))),
            2
        );
    }

    #[test]
    fn simultaneous_reset_requests_resolve_without_prompt() {
        let (mut host, mut client) = host_first_pair();
        host.play(0, 0).unwrap();
        deliver(&mut host, &mut client);
        client.play(1, 1).unwrap();
        deliver(&mut client, &mut host);

        host.request_reset().unwrap();
        client.request_reset().unwrap();

        // Both requests cross on the wire.
        deliver(&mut host, &mut client);
        deliver(&mut client, &mut host);
        // Host's START and both stale accepts.
        deliver(&mut host, &mut client);
        deliver(&mut client, &mut host);

        assert!(host.board().is_empty());
        assert!(client.board().is_empty());
        assert!(matches!(host.state(), SessionState::InTurn { .. }));
        assert_eq!(host.state(), client.state());
        assert_eq!(host.observer().count(|s| *s == Seen::Prompt), 0);
        assert_eq!(client.observer().count(|s| *s == Seen::Prompt), 0);
    }

    #[test]
    fn rejected_reset_leaves_game_untouched() {
        let (mut host, mut client) = host_first_pair();
        host.play(2, 0).unwrap();
        deliver(&mut host, &mut client);
        let board = host.board().clone();

        host.request_reset().unwrap();
        deliver(&mut host, &mut client);
        client.reject_reset().unwrap();
        deliver(&mut client, &mut host);

        assert_eq!(host.board(), &board);
        assert_eq!(client.board(), &board);
        assert_eq!(host.state(), SessionState::InTurn { active: Symbol::O });
        assert_eq!(client.state(), SessionState::InTurn { active: Symbol::O });
        assert_eq!(host.observer().count(|s| *s == Seen::Rejected), 1);
    }

    #[test]
    fn local_request_accepts_pending_remote_request() {
        let (mut host, mut client) = host_first_pair();
        client.request_reset().unwrap();
        deliver(&mut client, &mut host);

        host.request_reset().unwrap();
        assert_eq!(host.outbound().sent.front(), Some(&Message::ResetAccept));
        deliver(&mut host, &mut client);
        assert!(matches!(client.state(), SessionState::InTurn { .. }));
    }

    #[test]
    fn reset_api_errors() {
        let mut client = session(PeerRole::Client, 0);
        assert!(matches!(client.request_reset(), Err(SessionError::NotInGame)));

        let (mut host, _client) = connected_pair(5);
        assert!(matches!(
            host.accept_reset(),
            Err(SessionError::NoResetRequested)
        ));
        assert!(matches!(
            host.reject_reset(),
            Err(SessionError::NoResetRequested)
        ));

        host.request_reset().unwrap();
        host.request_reset().unwrap();
        let requests = host
            .outbound()
            .sent
            .iter()
            .filter(|m| **m == Message::ResetRequest)
            .count();
        assert_eq!(requests, 1);
    }

    #[test]
    fn remote_move_during_pending_reset_is_applied() {
        let (mut host, mut client) = host_first_pair();
        host.play(0, 0).unwrap();
        deliver(&mut host, &mut client);

        // Client moves, then sees the host's request before its move lands.
        client.play(1, 1).unwrap();
        host.request_reset().unwrap();
        deliver(&mut client, &mut host);

        assert_eq!(host.board().get(1, 1), Some(Symbol::O));
        assert!(matches!(host.state(), SessionState::ResetPending { .. }));
    }

    #[test]
    fn disconnect_ends_session_once() {
        let (mut host, mut client) = connected_pair(8);
        host.handle_disconnect("connection reset");
        host.handle_disconnect("again");
        host.exit();
        client.exit();
        client.exit();

        for s in [&host, &client] {
            assert_eq!(
                s.observer().count(|seen| matches!(seen, Seen::Ended(_))),
                1
            );
            assert_eq!(s.outbound().closed, 1);
            assert_eq!(s.state(), SessionState::Terminated);
        }
        assert!(host.observer().seen.contains(&Seen::Ended(
            EndReason::PeerDisconnected("connection reset".to_string())
        )));
        assert!(client
            .observer()
            .seen
            .contains(&Seen::Ended(EndReason::LocalExit)));
    }

    #[test]
    fn disconnect_mid_handshake_ends_session() {
        let (mut host, mut client) = host_first_pair();
        host.request_reset().unwrap();
        deliver(&mut host, &mut client);
        client.handle_disconnect("eof");

        assert_eq!(client.state(), SessionState::Terminated);
        assert!(matches!(client.accept_reset(), Err(SessionError::Terminated)));
        assert_eq!(client.play(0, 0), Err(MoveRejection::Terminated));

        let before = client.observer().seen.len();
        client.handle_message(Message::Move { row: 0, col: 0 });
        assert_eq!(client.observer().seen.len(), before);
    }

    #[test]
    fn send_failure_is_reported_not_fatal() {
        let (mut host, _client) = host_first_pair();
        host.outbound_mut().fail_sends = true;
        host.play(0, 0).unwrap();

        assert_eq!(host.observer().count(|s| *s == Seen::SendFailed), 1);
        assert_eq!(host.state(), SessionState::InTurn { active: Symbol::O });
        assert!(!host.is_terminated());
    }

    #[test]
    fn unknown_messages_are_ignored() {
        let (mut host, _client) = connected_pair(2);
        let before = host.state();
        host.handle_message(Message::Unknown {
            tag: "CHAT".to_string(),
        });
        assert_eq!(host.state(), before);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = SessionConfig {
            palette: vec![Color::new("red").unwrap()],
            ..SessionConfig::default()
        };
        let result = Session::new(PeerRole::Host, &config, Wire::default(), Recorder::default());
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn host_refuses_a_line_limit_too_short_for_start() {
        let config = SessionConfig {
            max_line_len: 16,
            rng_seed: Some(1),
            ..SessionConfig::default()
        };
        let result = Session::new(PeerRole::Host, &config, Wire::default(), Recorder::default());
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }
}
