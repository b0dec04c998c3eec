//! Database repository for players, finished games and win streaks.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use super::models::NewStreak;
use crate::db::{
    DbError, DbErrorKind, LeaderboardEntry, NewGame, NewPlayer, Player, StoredGame, Streak,
    schema,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for player and game operations.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for the SQLite file at the given path.
    ///
    /// No connection is opened until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(
                DbErrorKind::Connection,
                "database path must not be empty",
            ));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Path of the backing database.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })
    }

    /// Applies any pending embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, e.to_string()))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Inserts a player, or updates the name of the player already
    /// registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn upsert_player(&self, name: &str, email: &str) -> Result<Player, DbError> {
        debug!("Upserting player");
        let mut conn = self.connection()?;

        let player = diesel::insert_into(schema::players::table)
            .values(&NewPlayer::new(name.to_string(), email.to_string()))
            .on_conflict(schema::players::email)
            .do_update()
            .set(schema::players::name.eq(excluded(schema::players::name)))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id = player.id(), "Player stored");
        Ok(player)
    }

    /// Looks up a player by email. Returns `None` if not registered.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_email(&self, email: &str) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .filter(schema::players::email.eq(email))
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = player.is_some(), "Player lookup");
        Ok(player)
    }

    /// Records a finished game and updates the player's streak in the same
    /// transaction.
    ///
    /// A win extends the open streak or opens a new one. Any other outcome
    /// closes the open streak.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored outcome is invalid or a database
    /// error occurs. Nothing is written on error.
    #[instrument(skip(self, game), fields(player_id = game.player_id(), outcome = %game.outcome()))]
    pub fn save_game(&self, game: NewGame) -> Result<StoredGame, DbError> {
        let outcome = game.parse_outcome()?;
        let mut conn = self.connection()?;

        conn.transaction::<_, DbError, _>(|conn| {
            let stored = diesel::insert_into(schema::games::table)
                .values(&game)
                .returning(StoredGame::as_returning())
                .get_result(conn)?;

            let open = open_streak(conn, *stored.player_id())?;
            match (outcome.is_win(), open) {
                (true, Some(streak)) => {
                    diesel::update(schema::streaks::table.find(*streak.id()))
                        .set(schema::streaks::wins_count.eq(schema::streaks::wins_count + 1))
                        .execute(conn)?;
                    debug!(streak_id = streak.id(), wins = streak.wins_count() + 1, "Streak extended");
                }
                (true, None) => {
                    diesel::insert_into(schema::streaks::table)
                        .values(&NewStreak::new(*stored.player_id(), 1, *stored.played_at()))
                        .execute(conn)?;
                    debug!("Streak opened");
                }
                (false, Some(streak)) => {
                    diesel::update(schema::streaks::table.find(*streak.id()))
                        .set(schema::streaks::ended_at.eq(Some(*stored.played_at())))
                        .execute(conn)?;
                    debug!(streak_id = streak.id(), wins = streak.wins_count(), "Streak closed");
                }
                (false, None) => {}
            }

            info!(game_id = stored.id(), "Game recorded");
            Ok(stored)
        })
    }

    /// The player's open streak, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn current_streak(&self, player_id: i32) -> Result<Option<Streak>, DbError> {
        let mut conn = self.connection()?;
        open_streak(&mut conn, player_id)
    }

    /// All games for a player, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn games_for_player(&self, player_id: i32) -> Result<Vec<StoredGame>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::player_id.eq(player_id))
            .order((schema::games::played_at.desc(), schema::games::id.desc()))
            .select(StoredGame::as_select())
            .load(&mut conn)?;
        debug!(count = games.len(), "Games loaded");
        Ok(games)
    }

    /// Ranks every player with at least one recorded game by best streak,
    /// then wins, then name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;

        let players = schema::players::table
            .select(Player::as_select())
            .load(&mut conn)?;
        let games = schema::games::table
            .select(StoredGame::as_select())
            .load(&mut conn)?;
        let streaks = schema::streaks::table
            .select(Streak::as_select())
            .load(&mut conn)?;

        let mut totals: HashMap<i32, (i32, i32)> = HashMap::new();
        for game in &games {
            let entry = totals.entry(*game.player_id()).or_default();
            entry.0 += 1;
            match game.parse_outcome() {
                Ok(outcome) if outcome.is_win() => entry.1 += 1,
                Ok(_) => {}
                Err(e) => warn!(game_id = game.id(), error = %e, "Skipping unreadable outcome"),
            }
        }

        let mut best: HashMap<i32, i32> = HashMap::new();
        for streak in &streaks {
            let slot = best.entry(*streak.player_id()).or_default();
            *slot = (*slot).max(*streak.wins_count());
        }

        let mut entries: Vec<LeaderboardEntry> = players
            .iter()
            .filter_map(|player| {
                let (total, wins) = totals.get(player.id()).copied()?;
                let best_streak = best.get(player.id()).copied().unwrap_or(0);
                Some(LeaderboardEntry::new(
                    player.name().clone(),
                    best_streak,
                    total,
                    wins,
                ))
            })
            .collect();

        entries.sort_by(|a, b| {
            b.best_streak()
                .cmp(a.best_streak())
                .then_with(|| b.wins().cmp(a.wins()))
                .then_with(|| a.name().cmp(b.name()))
        });

        info!(count = entries.len(), "Leaderboard computed");
        Ok(entries)
    }
}

fn open_streak(conn: &mut SqliteConnection, player_id: i32) -> Result<Option<Streak>, DbError> {
    Ok(schema::streaks::table
        .filter(schema::streaks::player_id.eq(player_id))
        .filter(schema::streaks::ended_at.is_null())
        .select(Streak::as_select())
        .first(conn)
        .optional()?)
}
