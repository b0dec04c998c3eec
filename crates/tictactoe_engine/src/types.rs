//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Player in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Player {
    /// Player X (always moves first).
    X,
    /// Player O (moves second).
    O,
}

impl Player {
    /// The player who opens every game.
    pub const FIRST: Player = Player::X;

    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A cell on the board, addressed by row and column (each 0-2).
///
/// Positions are plain values: two positions are equal when their
/// coordinates are. Callers are expected to build them in range; the
/// board treats anything outside the grid as an empty, unplayable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// All 9 positions in row-major order.
    pub const ALL: [Position; 9] = [
        Position::new(0, 0),
        Position::new(0, 1),
        Position::new(0, 2),
        Position::new(1, 0),
        Position::new(1, 1),
        Position::new(1, 2),
        Position::new(2, 0),
        Position::new(2, 1),
        Position::new(2, 2),
    ];

    /// The center cell.
    pub const CENTER: Position = Position::new(1, 1);

    /// Creates a position without range checks.
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Creates a position if both coordinates are on the grid.
    pub fn checked(row: i64, col: i64) -> Option<Self> {
        let in_range = |v: i64| (0..3).contains(&v);
        (in_range(row) && in_range(col)).then(|| Self::new(row as u8, col as u8))
    }

    /// Creates a position from a row-major board index (0-8).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Row-major board index, or `None` when off the grid.
    pub fn index(self) -> Option<usize> {
        (self.row < 3 && self.col < 3).then(|| self.row as usize * 3 + self.col as usize)
    }

    /// Row (0 = top).
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column (0 = left).
    pub fn col(self) -> u8 {
        self.col
    }

    /// True for the four corner cells.
    pub fn is_corner(self) -> bool {
        matches!((self.row, self.col), (0 | 2, 0 | 2))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Difficulty tier of the computer opponent.
///
/// Each tier maps to a fixed search depth. The mapping never changes so that
/// a tier plays the same way from one release to the next.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// Random legal moves.
    Easy,
    /// Two-ply lookahead: takes immediate wins, blocks immediate losses.
    #[default]
    Medium,
    /// Exhaustive search; never loses.
    Hard,
}

impl Difficulty {
    /// Maximum search depth for this tier.
    pub const fn max_depth(self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 2,
            Difficulty::Hard => 9,
        }
    }
}

/// Outcome of the board, derived from the marks on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum GameResult {
    /// No winner yet and cells remain.
    InProgress,
    /// X completed a line.
    XWins,
    /// O completed a line.
    OWins,
    /// Board is full with no winner.
    Draw,
}

impl GameResult {
    /// True once the game has ended.
    pub fn is_finished(self) -> bool {
        self != GameResult::InProgress
    }

    /// Returns the winner if there is one.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::XWins => Some(Player::X),
            GameResult::OWins => Some(Player::O),
            GameResult::InProgress | GameResult::Draw => None,
        }
    }

    /// Result for a win by `player`.
    pub fn won_by(player: Player) -> Self {
        match player {
            Player::X => GameResult::XWins,
            Player::O => GameResult::OWins,
        }
    }
}

/// Outcome of a finished game from the human's point of view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// Human won.
    Win,
    /// Computer won.
    Loss,
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// True for [`Outcome::Win`].
    pub fn is_win(self) -> bool {
        self == Outcome::Win
    }
}
