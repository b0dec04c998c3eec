//! Game state snapshot and move rejection reasons.

use crate::board::{Board, WinningLine};
use crate::types::{Difficulty, GameResult, Outcome, Player, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason a move was refused.
///
/// These are expected outcomes of normal play, returned as values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
pub enum TurnError {
    /// The target cell already holds a mark.
    #[display("Cell is already occupied")]
    Occupied,

    /// The game has been won or drawn.
    #[display("Game is already over")]
    GameOver,

    /// The other side is to move.
    #[display("It is not your turn")]
    NotYourTurn,
}

impl TurnError {
    /// Stable short code for hosts that pass errors across a boundary.
    pub fn code(self) -> &'static str {
        match self {
            TurnError::Occupied => "occupied",
            TurnError::GameOver => "gameOver",
            TurnError::NotYourTurn => "notYourTurn",
        }
    }
}

/// Complete state of one game.
///
/// Everything beyond the stored fields (result, whose turn it effectively
/// is, the winning line, the human's outcome) is derived from the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Player,
    difficulty: Difficulty,
    human_player: Player,
    started_at: DateTime<Utc>,
}

impl GameState {
    /// Creates a fresh game with an empty board and X to move.
    pub fn new(difficulty: Difficulty, human_player: Player) -> Self {
        Self::starting_at(difficulty, human_player, Utc::now())
    }

    /// Creates a fresh game with an explicit start time.
    pub fn starting_at(
        difficulty: Difficulty,
        human_player: Player,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            board: Board::new(),
            current_player: Player::FIRST,
            difficulty,
            human_player,
            started_at,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player whose mark goes down next.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Configured difficulty tier.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Side played by the human.
    pub fn human_player(&self) -> Player {
        self.human_player
    }

    /// Side played by the computer.
    pub fn computer_player(&self) -> Player {
        self.human_player.opponent()
    }

    /// When the game started.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Result derived from the board.
    pub fn result(&self) -> GameResult {
        self.board.result()
    }

    /// True once the game has been won or drawn.
    pub fn is_game_over(&self) -> bool {
        self.result().is_finished()
    }

    /// True when the human may move.
    pub fn is_human_turn(&self) -> bool {
        self.current_player == self.human_player && !self.is_game_over()
    }

    /// True when the computer is due to move.
    pub fn is_computer_turn(&self) -> bool {
        self.current_player == self.computer_player() && !self.is_game_over()
    }

    /// Number of marks on the board.
    pub fn turn_count(&self) -> usize {
        self.board.turn_count()
    }

    /// The completed line, if someone has won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        self.board.winner().map(|(_, line)| line)
    }

    /// Time elapsed since the game started.
    pub fn duration(&self) -> chrono::Duration {
        self.duration_at(Utc::now())
    }

    /// Time elapsed between the start and `now`.
    pub fn duration_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.started_at
    }

    /// Outcome from the human's side, once the game is over.
    pub fn outcome_for_human(&self) -> Option<Outcome> {
        match self.result() {
            GameResult::InProgress => None,
            GameResult::Draw => Some(Outcome::Draw),
            result if result.winner() == Some(self.human_player) => Some(Outcome::Win),
            _ => Some(Outcome::Loss),
        }
    }

    /// Returns the state after `player` marks `position`, with the turn
    /// passed to the opponent. Legality is checked by the caller.
    #[must_use]
    pub fn after(&self, position: Position, player: Player) -> GameState {
        Self {
            board: self.board.with_mark(position, player),
            current_player: player.opponent(),
            ..self.clone()
        }
    }

    pub(crate) fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn play(state: &GameState, moves: &[(u8, u8)]) -> GameState {
        moves.iter().fold(state.clone(), |s, &(r, c)| {
            let who = s.current_player();
            s.after(Position::new(r, c), who)
        })
    }

    #[test]
    fn test_new_game_x_moves_first() {
        let human_x = GameState::new(Difficulty::Hard, Player::X);
        assert_eq!(human_x.current_player(), Player::X);
        assert!(human_x.is_human_turn());
        assert!(!human_x.is_computer_turn());

        let human_o = GameState::new(Difficulty::Hard, Player::O);
        assert_eq!(human_o.current_player(), Player::X);
        assert!(human_o.is_computer_turn());
        assert_eq!(human_o.computer_player(), Player::X);
    }

    #[test]
    fn test_after_advances_turn_and_keeps_config() {
        let s = GameState::new(Difficulty::Easy, Player::O);
        let next = s.after(Position::CENTER, Player::X);
        assert_eq!(next.current_player(), Player::O);
        assert_eq!(next.board().occupant(Position::CENTER), Some(Player::X));
        assert_eq!(next.difficulty(), Difficulty::Easy);
        assert_eq!(next.start_time(), s.start_time());
        assert_eq!(s.turn_count(), 0);
    }

    #[test]
    fn test_outcome_for_human() {
        let s = GameState::new(Difficulty::Medium, Player::X);
        // X: top row.
        let won = play(&s, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(won.result(), GameResult::XWins);
        assert_eq!(won.outcome_for_human(), Some(Outcome::Win));
        assert_eq!(
            won.winning_line(),
            Some([Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)])
        );
        assert!(!won.is_human_turn());
        assert!(!won.is_computer_turn());

        let s = GameState::new(Difficulty::Medium, Player::O);
        let lost = play(&s, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(lost.outcome_for_human(), Some(Outcome::Loss));
    }

    #[test]
    fn test_drawn_game() {
        let s = GameState::new(Difficulty::Medium, Player::X);
        let drawn = play(
            &s,
            &[(0, 0), (1, 1), (0, 2), (0, 1), (2, 1), (1, 2), (1, 0), (2, 0), (2, 2)],
        );
        assert_eq!(drawn.board().to_string(), "X O X\nX O O\nO X X");
        assert_eq!(drawn.result(), GameResult::Draw);
        assert!(drawn.is_game_over());
        assert_eq!(drawn.outcome_for_human(), Some(Outcome::Draw));
        assert_eq!(drawn.winning_line(), None);
    }

    #[test]
    fn test_in_progress_has_no_outcome() {
        let s = GameState::new(Difficulty::Medium, Player::X);
        assert_eq!(s.outcome_for_human(), None);
        assert_eq!(s.winning_line(), None);
    }

    #[test]
    fn test_duration_measured_from_start() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().expect("valid time");
        let s = GameState::starting_at(Difficulty::Medium, Player::X, start);
        let later = start + chrono::Duration::seconds(42);
        assert_eq!(s.duration_at(later), chrono::Duration::seconds(42));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TurnError::Occupied.code(), "occupied");
        assert_eq!(TurnError::GameOver.code(), "gameOver");
        assert_eq!(TurnError::NotYourTurn.code(), "notYourTurn");
        assert_eq!(TurnError::GameOver.to_string(), "Game is already over");
    }
}
