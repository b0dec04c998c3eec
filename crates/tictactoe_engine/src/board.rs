//! Immutable 3x3 board and the win/draw rules that read it.

use crate::types::{GameResult, Player, Position};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Three positions that win when held by one player.
pub type WinningLine = [Position; 3];

/// The 8 winning lines, in scan order: rows top to bottom, columns left to
/// right, then the main and anti diagonals.
pub const WINNING_LINES: [WinningLine; 8] = [
    // Rows
    [Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)],
    [Position::new(1, 0), Position::new(1, 1), Position::new(1, 2)],
    [Position::new(2, 0), Position::new(2, 1), Position::new(2, 2)],
    // Columns
    [Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)],
    [Position::new(0, 1), Position::new(1, 1), Position::new(2, 1)],
    [Position::new(0, 2), Position::new(1, 2), Position::new(2, 2)],
    // Diagonals
    [Position::new(0, 0), Position::new(1, 1), Position::new(2, 2)],
    [Position::new(0, 2), Position::new(1, 1), Position::new(2, 0)],
];

/// 3x3 tic-tac-toe board.
///
/// A `Board` is a value: [`Board::with_mark`] returns a new board and leaves
/// the receiver untouched, so a board handed to the search can never be
/// changed underneath it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Option<Player>; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the player occupying `position`.
    ///
    /// Positions off the grid are never occupied.
    pub fn occupant(&self, position: Position) -> Option<Player> {
        position.index().and_then(|i| self.cells[i])
    }

    /// True if `position` is on the grid and nobody has played there.
    pub fn is_empty_at(&self, position: Position) -> bool {
        position.index().is_some_and(|i| self.cells[i].is_none())
    }

    /// Empty positions in row-major order.
    ///
    /// The order is part of the contract: the search enumerates moves in this
    /// order and breaks ties by it.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.empties().collect()
    }

    pub(crate) fn empties(&self) -> impl Iterator<Item = Position> + '_ {
        Position::ALL
            .into_iter()
            .filter(|pos| self.is_empty_at(*pos))
    }

    /// Returns a copy of this board with `by` placed at `at`.
    ///
    /// Callers check that the cell is free first; an off-grid position
    /// returns an unchanged copy.
    #[must_use]
    pub fn with_mark(&self, at: Position, by: Player) -> Board {
        let mut next = *self;
        if let Some(i) = at.index() {
            next.cells[i] = Some(by);
        }
        next
    }

    /// Returns the winner and the line they completed.
    ///
    /// Lines are scanned in [`WINNING_LINES`] order and the first complete
    /// one is reported, so a board with two complete lines (impossible in
    /// legal play) still gives a deterministic answer.
    pub fn winner(&self) -> Option<(Player, WinningLine)> {
        WINNING_LINES.into_iter().find_map(|line| {
            let [a, b, c] = line.map(|pos| self.occupant(pos));
            match a {
                Some(player) if a == b && b == c => Some((player, line)),
                _ => None,
            }
        })
    }

    /// True when every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of marks placed so far.
    pub fn turn_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Number of marks placed by `player`.
    pub fn count_of(&self, player: Player) -> usize {
        self.cells.iter().filter(|c| **c == Some(player)).count()
    }

    /// Win, draw or still in progress.
    #[instrument(level = "trace", skip(self))]
    pub fn result(&self) -> GameResult {
        match self.winner() {
            Some((player, _)) => GameResult::won_by(player),
            None if self.is_full() => GameResult::Draw,
            None => GameResult::InProgress,
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[Option<Player>; 9] {
        &self.cells
    }
}

impl std::fmt::Display for Board {
    /// Renders three rows of `X`, `O` or `.` separated by spaces.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, cells) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            let symbols: Vec<&str> = cells
                .iter()
                .map(|c| match c {
                    Some(Player::X) => "X",
                    Some(Player::O) => "O",
                    None => ".",
                })
                .collect();
            write!(f, "{}", symbols.join(" "))?;
        }
        Ok(())
    }
}

/// Error parsing a board from text.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardParseError {
    /// A character other than `X`, `O`, `.`, `_` or whitespace/`/`.
    #[display("unexpected character {:?} in board", _0)]
    UnexpectedChar(#[error(not(source))] char),

    /// The text did not describe exactly 9 cells.
    #[display("expected 9 cells, found {}", _0)]
    WrongCellCount(#[error(not(source))] usize),
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses 9 cells in row-major order. `X`/`O` are marks, `.`/`_` empty;
    /// whitespace, `|` and `/` are separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::with_capacity(9);
        for ch in s.chars() {
            match ch {
                'X' | 'x' => cells.push(Some(Player::X)),
                'O' | 'o' => cells.push(Some(Player::O)),
                '.' | '_' => cells.push(None),
                c if c.is_whitespace() || c == '/' || c == '|' => {}
                other => return Err(BoardParseError::UnexpectedChar(other)),
            }
        }
        let cells: [Option<Player>; 9] = cells
            .try_into()
            .map_err(|v: Vec<_>| BoardParseError::WrongCellCount(v.len()))?;
        Ok(Self { cells })
    }
}
