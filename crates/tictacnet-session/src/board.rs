use std::fmt;

use serde::Serialize;
use tictacnet_frame::{Symbol, MAX_COORD};

use crate::error::MoveRejection;

const SIZE: usize = MAX_COORD as usize + 1;

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    WinnerX,
    WinnerO,
    Draw,
}

impl Outcome {
    /// Outcome for `symbol` having completed a line.
    pub fn win_for(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Outcome::WinnerX,
            Symbol::O => Outcome::WinnerO,
        }
    }

    /// The winning symbol, or `None` for a draw.
    pub fn winner(self) -> Option<Symbol> {
        match self {
            Outcome::WinnerX => Some(Symbol::X),
            Outcome::WinnerO => Some(Symbol::O),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::WinnerX => f.write_str("X wins"),
            Outcome::WinnerO => f.write_str("O wins"),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

/// 3×3 grid of marks.
///
/// Marks are only ever added into empty cells; the only way to remove one is
/// [`clear`](Board::clear), which empties the whole board for a new game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    cells: [[Option<Symbol>; SIZE]; SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from rows, for tests and replays.
    pub fn from_rows(cells: [[Option<Symbol>; SIZE]; SIZE]) -> Self {
        Self { cells }
    }

    /// Mark at `(row, col)`; `None` for an empty or out-of-range cell.
    pub fn get(&self, row: u8, col: u8) -> Option<Symbol> {
        self.cells
            .get(usize::from(row))
            .and_then(|r| r.get(usize::from(col)))
            .copied()
            .flatten()
    }

    /// Place `symbol` at `(row, col)`.
    pub fn place_mark(&mut self, row: u8, col: u8, symbol: Symbol) -> Result<(), MoveRejection> {
        if row > MAX_COORD || col > MAX_COORD {
            return Err(MoveRejection::OutOfBounds { row, col });
        }
        let cell = &mut self.cells[usize::from(row)][usize::from(col)];
        if cell.is_some() {
            return Err(MoveRejection::Occupied { row, col });
        }
        *cell = Some(symbol);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// Number of marks on the board.
    pub fn marks(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.cells = Default::default();
    }

    pub fn rows(&self) -> &[[Option<Symbol>; SIZE]; SIZE] {
        &self.cells
    }

    fn owns_line(&self, symbol: Symbol) -> bool {
        let owns = |row: usize, col: usize| self.cells[row][col] == Some(symbol);

        (0..SIZE).any(|r| (0..SIZE).all(|c| owns(r, c)))
            || (0..SIZE).any(|c| (0..SIZE).all(|r| owns(r, c)))
            || (0..SIZE).all(|i| owns(i, i))
            || (0..SIZE).all(|i| owns(i, SIZE - 1 - i))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<&str> = row
                .iter()
                .map(|cell| cell.map(Symbol::as_str).unwrap_or("."))
                .collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Outcome after `symbol` has just moved, or `None` if play continues.
///
/// Only `symbol`'s lines are checked: a move can only complete a line for the
/// player who made it. A winning move that also fills the board is a win.
pub fn evaluate_board(board: &Board, symbol: Symbol) -> Option<Outcome> {
    if board.owns_line(symbol) {
        Some(Outcome::win_for(symbol))
    } else if board.is_full() {
        Some(Outcome::Draw)
    } else {
        None
    }
}
