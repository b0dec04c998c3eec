//! Flat, host-facing projection of a game state.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tictactoe_engine::{Difficulty, GameResult, GameState, Outcome, Player, Position};

/// Snapshot of a [`GameState`] as sent over the bridge.
///
/// Cells are encoded as `1` for X, `-1` for O and `0` for empty, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    board: [i8; 9],
    current_player: Player,
    result: GameResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<Player>,
    is_game_over: bool,
    is_human_turn: bool,
    is_computer_turn: bool,
    turn_count: usize,
    difficulty: Difficulty,
    human_player: Player,
    computer_player: Player,
    #[serde(skip_serializing_if = "Option::is_none")]
    winning_line: Option<Vec<Position>>,
    /// Epoch milliseconds.
    started_at: i64,
    /// Elapsed milliseconds.
    duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
}

impl GameSnapshot {
    /// Projects `state`, measuring the duration up to `now`.
    pub fn from_state(state: &GameState, now: DateTime<Utc>) -> Self {
        let mut board = [0i8; 9];
        for (cell, mark) in board.iter_mut().zip(state.board().cells()) {
            *cell = match mark {
                Some(Player::X) => 1,
                Some(Player::O) => -1,
                None => 0,
            };
        }
        let result = state.result();
        Self {
            board,
            current_player: state.current_player(),
            result,
            winner: result.winner(),
            is_game_over: state.is_game_over(),
            is_human_turn: state.is_human_turn(),
            is_computer_turn: state.is_computer_turn(),
            turn_count: state.turn_count(),
            difficulty: state.difficulty(),
            human_player: state.human_player(),
            computer_player: state.computer_player(),
            winning_line: state.winning_line().map(|line| line.to_vec()),
            started_at: state.start_time().timestamp_millis(),
            duration: state.duration_at(now).num_milliseconds().max(0),
            outcome: state.outcome_for_human(),
        }
    }
}

impl From<&GameState> for GameSnapshot {
    fn from(state: &GameState) -> Self {
        Self::from_state(state, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_engine::Engine;

    #[test]
    fn test_snapshot_of_new_game() {
        let state = GameState::new(Difficulty::Hard, Player::X);
        let snap = GameSnapshot::from_state(&state, state.start_time());
        assert_eq!(snap.board(), &[0; 9]);
        assert_eq!(*snap.current_player(), Player::X);
        assert!(*snap.is_human_turn());
        assert!(!*snap.is_game_over());
        assert_eq!(*snap.duration(), 0);

        let json = serde_json::to_value(&snap).expect("serialize");
        assert_eq!(json["result"], "inProgress");
        assert_eq!(json["difficulty"], "hard");
        assert_eq!(json["computerPlayer"], "O");
        assert!(json.get("winner").is_none());
        assert!(json.get("winningLine").is_none());
        assert!(json.get("outcome").is_none());
    }

    #[test]
    fn test_snapshot_encodes_marks_and_duration() {
        let mut engine = Engine::new(Difficulty::Hard, Player::X);
        let state = engine.play_turn(Position::CENTER).expect("legal move");
        let later = state.start_time() + chrono::Duration::milliseconds(1500);
        let snap = GameSnapshot::from_state(&state, later);
        assert_eq!(snap.board()[4], 1);
        assert_eq!(snap.board()[0], -1);
        assert_eq!(*snap.turn_count(), 2);
        assert_eq!(*snap.duration(), 1500);
    }

    #[test]
    fn test_snapshot_of_finished_game() {
        let mut engine = Engine::new(Difficulty::Hard, Player::O);
        let mut state = engine.play_computer_turn().expect("computer opens");
        while !state.is_game_over() {
            let pos = state.board().empty_positions()[0];
            state = engine.play_turn(pos).expect("legal move");
        }
        let snap = GameSnapshot::from(&state);
        assert!(*snap.is_game_over());
        assert_eq!(*snap.outcome(), state.outcome_for_human());
        assert_eq!(snap.winning_line().is_some(), snap.winner().is_some());
        let json = serde_json::to_value(&snap).expect("serialize");
        assert!(json.get("outcome").is_some());
    }
}
