use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use tictacnet_frame::Symbol;
use tictacnet_session::{
    Board, EndReason, Link, LocalCommand, MoveRejection, PeerRole, SessionConfig, SessionDriver,
    SessionError, SessionObserver, SessionState, StopFlag, TurnColors,
};
use tracing::debug;

use crate::exit::{end_reason_code, session_error, CliError, CliResult, INTERNAL};
use crate::input::{parse_input, Input, HELP};
use crate::output::{print_event, Event, OutputFormat};

/// How long the loop waits for a network event before checking input.
const TICK: Duration = Duration::from_millis(50);

/// Prints session callbacks to stdout in the selected format.
struct ConsoleObserver {
    format: OutputFormat,
    you: Symbol,
}

impl SessionObserver for ConsoleObserver {
    fn on_state_changed(&mut self, state: &SessionState) {
        if state.is_terminated() {
            return;
        }
        print_event(
            &Event::State {
                state,
                you: self.you,
            },
            self.format,
        );
    }

    fn on_board_changed(&mut self, board: &Board) {
        print_event(&Event::Board { board }, self.format);
    }

    fn on_game_started(&mut self, first_turn: Symbol, colors: &TurnColors) {
        print_event(
            &Event::GameStarted {
                first_turn,
                color_x: &colors.x,
                color_o: &colors.o,
                you: self.you,
                your_color: colors.for_symbol(self.you),
            },
            self.format,
        );
    }

    fn on_reset_prompt(&mut self) {
        print_event(&Event::ResetPrompt, self.format);
    }

    fn on_reset_rejected(&mut self) {
        print_event(&Event::ResetRejected, self.format);
    }

    fn on_session_ended(&mut self, reason: &EndReason) {
        print_event(&Event::Ended { reason }, self.format);
    }

    fn on_move_rejected(&mut self, rejection: &MoveRejection) {
        print_event(
            &Event::MoveRejected {
                reason: rejection.to_string(),
            },
            self.format,
        );
    }

    fn on_command_rejected(&mut self, error: &SessionError) {
        print_event(
            &Event::CommandRejected {
                reason: error.to_string(),
            },
            self.format,
        );
    }

    fn on_send_failed(&mut self, error: &SessionError) {
        print_event(
            &Event::SendFailed {
                reason: error.to_string(),
            },
            self.format,
        );
    }
}

/// Play one session on the terminal until either side leaves.
pub fn run(
    role: PeerRole,
    link: Link,
    config: &SessionConfig,
    format: OutputFormat,
    interrupted: StopFlag,
) -> CliResult<i32> {
    let you = role.local_symbol();
    print_event(
        &Event::Connected {
            peer: link.peer_addr(),
            role,
            symbol: you,
        },
        format,
    );
    if !matches!(format, OutputFormat::Json) {
        print_event(
            &Event::Notice {
                message: "type `help` for commands",
            },
            format,
        );
    }

    let observer = ConsoleObserver { format, you };
    let mut driver = SessionDriver::start(role, link, config, observer)
        .map_err(|err| session_error("session start failed", err))?;
    let input = spawn_stdin_reader()?;
    let mut exit_posted = false;

    while driver.step(TICK) {
        if interrupted.is_stopped() && !exit_posted {
            debug!("interrupted, leaving game");
            exit_posted = driver.dispatcher().command(LocalCommand::Exit);
        }

        loop {
            match input.try_recv() {
                Ok(line) => handle_line(&mut driver, &line, format),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !exit_posted {
                        debug!("stdin closed, leaving game");
                        exit_posted = driver.dispatcher().command(LocalCommand::Exit);
                    }
                    break;
                }
            }
        }
    }

    let reason = driver.run();
    Ok(end_reason_code(&reason))
}

fn handle_line(driver: &mut SessionDriver<ConsoleObserver>, line: &str, format: OutputFormat) {
    match parse_input(line) {
        Ok(Some(Input::Command(command))) => {
            driver.dispatcher().command(command);
        }
        Ok(Some(Input::ShowBoard)) => {
            print_event(
                &Event::Board {
                    board: driver.session().board(),
                },
                format,
            );
        }
        Ok(Some(Input::Help)) => print_event(&Event::Notice { message: HELP }, format),
        Ok(None) => {}
        Err(message) => print_event(&Event::Notice { message: &message }, format),
    }
}

fn spawn_stdin_reader() -> CliResult<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("tictacnet-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    return;
                };
                if tx.send(line).is_err() {
                    return;
                }
            }
        })
        .map_err(|err| CliError::new(INTERNAL, format!("stdin reader setup failed: {err}")))?;
    Ok(rx)
}

/// Route Ctrl-C to `interrupted`. The host's wait and the game loop both
/// watch it.
pub fn install_ctrlc_handler(interrupted: StopFlag) -> CliResult<()> {
    ctrlc::set_handler(move || {
        interrupted.stop();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
