use std::io::IsTerminal;
use std::net::{IpAddr, SocketAddr};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, CellAlignment, ContentArrangement, Table};
use serde::Serialize;
use tictacnet_frame::{Color, Symbol};
use tictacnet_session::{Board, EndReason, PeerRole, SessionState};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Something worth telling the player. One JSON object per event in `json`
/// mode.
#[derive(Serialize, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    Listening {
        address: SocketAddr,
        share: SocketAddr,
    },
    Connected {
        peer: SocketAddr,
        role: PeerRole,
        symbol: Symbol,
    },
    GameStarted {
        first_turn: Symbol,
        color_x: &'a Color,
        color_o: &'a Color,
        you: Symbol,
        your_color: &'a Color,
    },
    State {
        state: &'a SessionState,
        you: Symbol,
    },
    Board {
        board: &'a Board,
    },
    ResetPrompt,
    ResetRejected,
    MoveRejected {
        reason: String,
    },
    CommandRejected {
        reason: String,
    },
    SendFailed {
        reason: String,
    },
    Ended {
        reason: &'a EndReason,
    },
    NetInfo {
        address: IpAddr,
        port: u16,
    },
    Notice {
        message: &'a str,
    },
}

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    event: &'a Event<'a>,
    timestamp: String,
}

pub fn print_event(event: &Event<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let line = JsonLine {
                event,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&line).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => match event {
            Event::Board { board } => println!("{}", board_table(board)),
            Event::NetInfo { address, port } => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["ADDRESS", "PORT"])
                    .add_row(vec![address.to_string(), port.to_string()]);
                println!("{table}");
            }
            other => println!("{}", describe(other)),
        },
        OutputFormat::Pretty => println!("{}", describe(event)),
    }
}

/// The board as a grid with row and column numbers.
pub fn board_table(board: &Board) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["", "0", "1", "2"]);

    for (index, row) in board.rows().iter().enumerate() {
        let mut cells = vec![index.to_string()];
        cells.extend(
            row.iter()
                .map(|cell| cell.map(Symbol::as_str).unwrap_or(" ").to_string()),
        );
        table.add_row(cells);
    }
    for column in table.column_iter_mut() {
        column.set_cell_alignment(CellAlignment::Center);
    }
    table
}

/// One-line plain text for an event.
pub fn describe(event: &Event<'_>) -> String {
    match event {
        Event::Listening { address, share } => {
            format!("listening on {address}; tell your opponent to join {share}")
        }
        Event::Connected { peer, role, symbol } => {
            format!("connected to {peer} as {role}; you play {symbol}")
        }
        Event::GameStarted {
            first_turn,
            color_x,
            color_o,
            you,
            your_color,
        } => format!(
            "new game: X is {color_x}, O is {color_o}; {first_turn} moves first \
             (you are {you} in {your_color})"
        ),
        Event::State { state, you } => match state {
            SessionState::InTurn { active } if active == you => "your move".to_string(),
            SessionState::InTurn { active } => format!("waiting for {active}"),
            SessionState::GameOver { outcome } => match outcome.winner() {
                Some(winner) if winner == *you => "game over: you win! (`reset` to play again)".to_string(),
                Some(_) => "game over: you lose (`reset` to play again)".to_string(),
                None => "game over: draw (`reset` to play again)".to_string(),
            },
            other => other.to_string(),
        },
        Event::Board { board } => board.to_string(),
        Event::ResetPrompt => "opponent wants to restart: `accept` or `reject`?".to_string(),
        Event::ResetRejected => "opponent rejected the reset; game continues".to_string(),
        Event::MoveRejected { reason } => format!("move rejected: {reason}"),
        Event::CommandRejected { reason } => format!("command rejected: {reason}"),
        Event::SendFailed { reason } => format!("could not reach opponent: {reason}"),
        Event::Ended { reason } => format!("session ended: {reason}"),
        Event::NetInfo { address, port } => format!("address={address} port={port}"),
        Event::Notice { message } => (*message).to_string(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
