//! Database models.

use chrono::{DateTime, NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;
use std::str::FromStr;
use tictactoe_engine::{Difficulty, GameState, Outcome};
use tracing::instrument;

use crate::db::{DbError, schema};

/// Registered player, identified by email.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct Player {
    id: i32,
    name: String,
    email: String,
    created_at: NaiveDateTime,
}

/// Insertable player.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    name: String,
    email: String,
}

/// A finished game as stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(belongs_to(Player))]
pub struct StoredGame {
    id: i32,
    player_id: i32,
    outcome: String,
    difficulty: String,
    duration_secs: i32,
    played_at: NaiveDateTime,
}

impl StoredGame {
    /// Parses the stored outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown value.
    pub fn parse_outcome(&self) -> Result<Outcome, DbError> {
        parse_outcome(&self.outcome)
    }
}

/// Parses an `outcome` column value.
fn parse_outcome(value: &str) -> Result<Outcome, DbError> {
    Ok(Outcome::from_str(value)?)
}

/// Insertable game row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    player_id: i32,
    outcome: String,
    difficulty: String,
    duration_secs: i32,
    played_at: NaiveDateTime,
}

impl NewGame {
    /// Builds the row for a finished game, stamped with the time it ended.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the game is still in progress.
    #[instrument(skip(state), fields(result = %state.result()))]
    pub fn from_state(
        player_id: i32,
        state: &GameState,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, DbError> {
        let outcome = state
            .outcome_for_human()
            .ok_or_else(|| DbError::record("cannot record a game that is still in progress"))?;
        let duration_secs =
            state.duration_at(finished_at).num_seconds().clamp(0, i64::from(i32::MAX)) as i32;
        Ok(Self::new(
            player_id,
            outcome.to_string(),
            state.difficulty().to_string(),
            duration_secs,
            finished_at.naive_utc(),
        ))
    }

    /// Builds a row from already-known values.
    pub fn from_parts(
        player_id: i32,
        outcome: Outcome,
        difficulty: Difficulty,
        duration_secs: i32,
        played_at: NaiveDateTime,
    ) -> Self {
        Self::new(
            player_id,
            outcome.to_string(),
            difficulty.to_string(),
            duration_secs,
            played_at,
        )
    }

    /// Parses the outcome column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the value is not a known outcome.
    pub fn parse_outcome(&self) -> Result<Outcome, DbError> {
        parse_outcome(&self.outcome)
    }
}

/// A run of consecutive wins. Open while `ended_at` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::streaks)]
#[diesel(belongs_to(Player))]
pub struct Streak {
    id: i32,
    player_id: i32,
    wins_count: i32,
    started_at: NaiveDateTime,
    ended_at: Option<NaiveDateTime>,
}

impl Streak {
    /// True while the streak is still running.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::streaks)]
pub(super) struct NewStreak {
    player_id: i32,
    wins_count: i32,
    started_at: NaiveDateTime,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    name: String,
    best_streak: i32,
    total: i32,
    wins: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tictactoe_engine::{Engine, Player as Side};

    #[test]
    fn test_new_game_rejects_unfinished() {
        let state = GameState::new(Difficulty::Hard, Side::X);
        let err = NewGame::from_state(1, &state, Utc::now()).expect_err("in progress");
        assert_eq!(err.kind, crate::db::DbErrorKind::Record);
    }

    #[test]
    fn test_new_game_from_finished_state() {
        let mut engine = Engine::seeded(Difficulty::Easy, Side::X, 5);
        let mut state = engine.current_state();
        while !state.is_game_over() {
            let pos = state.board().empty_positions()[0];
            state = engine.play_turn(pos).expect("legal move");
        }
        let end = state.start_time() + chrono::Duration::seconds(30);
        let row = NewGame::from_state(7, &state, end).expect("finished game");
        assert_eq!(*row.player_id(), 7);
        assert_eq!(*row.duration_secs(), 30);
        assert_eq!(row.difficulty(), "easy");
        assert_eq!(row.parse_outcome().ok(), state.outcome_for_human());
        assert_eq!(*row.played_at(), end.naive_utc());
    }

    #[test]
    fn test_from_parts() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid time");
        let row = NewGame::from_parts(2, Outcome::Loss, Difficulty::Hard, 12, at.naive_utc());
        assert_eq!(row.outcome(), "loss");
        assert_eq!(row.difficulty(), "hard");
    }

    #[test]
    fn test_parse_outcome_column() {
        assert_eq!(parse_outcome("win").ok(), Some(Outcome::Win));
        assert_eq!(parse_outcome("draw").ok(), Some(Outcome::Draw));
        let err = parse_outcome("forfeit").expect_err("unknown outcome");
        assert_eq!(err.kind, crate::db::DbErrorKind::Record);
    }
}
