use tictacnet_session::LocalCommand;

pub const HELP: &str = "\
commands:
  <row> <col>      place your mark (0-2 each), e.g. `1 1`
  move <row> <col> same as above
  reset            ask the opponent to restart the game
  accept | y       accept the opponent's reset request
  reject | n       reject the opponent's reset request
  board            show the board
  help             show this help
  quit             leave the game";

/// One line typed by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(LocalCommand),
    ShowBoard,
    Help,
}

/// Parse a line of player input. Blank lines yield `Ok(None)`.
pub fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let lowered = line.trim().to_ascii_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let input = match words.as_slice() {
        [] => return Ok(None),
        ["move", row, col] => play(row, col)?,
        ["move", ..] => return Err("usage: move <row> <col>".to_string()),
        [row, col] => play(row, col)?,
        ["reset"] => Input::Command(LocalCommand::RequestReset),
        ["accept" | "yes" | "y"] => Input::Command(LocalCommand::AcceptReset),
        ["reject" | "no" | "n"] => Input::Command(LocalCommand::RejectReset),
        ["quit" | "exit" | "q"] => Input::Command(LocalCommand::Exit),
        ["board" | "b"] => Input::ShowBoard,
        ["help" | "h" | "?"] => Input::Help,
        _ => return Err(format!("unknown command: {} (try `help`)", line.trim())),
    };
    Ok(Some(input))
}

fn play(row: &str, col: &str) -> Result<Input, String> {
    Ok(Input::Command(LocalCommand::Play {
        row: parse_coord(row)?,
        col: parse_coord(col)?,
    }))
}

fn parse_coord(value: &str) -> Result<u8, String> {
    value
        .parse()
        .map_err(|_| format!("invalid coordinate: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> LocalCommand {
        match parse_input(line) {
            Ok(Some(Input::Command(command))) => command,
            other => panic!("expected a command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn moves() {
        assert_eq!(command("1 2"), LocalCommand::Play { row: 1, col: 2 });
        assert_eq!(command("  move 0 0 "), LocalCommand::Play { row: 0, col: 0 });
        assert_eq!(command("MOVE 2 1"), LocalCommand::Play { row: 2, col: 1 });
    }

    #[test]
    fn out_of_range_coordinates_are_left_to_the_session() {
        assert_eq!(command("5 0"), LocalCommand::Play { row: 5, col: 0 });
    }

    #[test]
    fn reset_answers_and_quit() {
        assert_eq!(command("reset"), LocalCommand::RequestReset);
        assert_eq!(command("y"), LocalCommand::AcceptReset);
        assert_eq!(command("Yes"), LocalCommand::AcceptReset);
        assert_eq!(command("no"), LocalCommand::RejectReset);
        assert_eq!(command("quit"), LocalCommand::Exit);
        assert_eq!(command("exit"), LocalCommand::Exit);
    }

    #[test]
    fn view_commands() {
        assert_eq!(parse_input("board"), Ok(Some(Input::ShowBoard)));
        assert_eq!(parse_input("help"), Ok(Some(Input::Help)));
        assert_eq!(parse_input("   "), Ok(None));
    }

    #[test]
    fn bad_input() {
        assert!(parse_input("a b").is_err());
        assert!(parse_input("move 1").is_err());
        assert!(parse_input("1 2 3").is_err());
        assert!(parse_input("dance").is_err());
        assert!(parse_input("-1 0").is_err());
    }
}
