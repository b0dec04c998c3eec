//! A hosted game session.
//!
//! Wraps a [`SharedEngine`] and reports every finished game: the result is
//! stored when a player is registered against a database, and a
//! notification is posted when a receiver is configured. Reporting never
//! changes the game; failures are logged and the move still succeeds.
//! Each game is reported at most once per session, keyed by its start time.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use std::sync::{Arc, Mutex, MutexGuard};
use tictactoe_engine::{Difficulty, GameState, Player, Position, SharedEngine, TurnError};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, GameRepository, NewGame, StoredGame};
use crate::notify::{Notifier, NotifyReceipt, ResultPayload, is_valid_email};

/// Who is playing, as given at registration.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Profile {
    name: String,
    email: String,
    /// Database id, when a repository is attached.
    player_id: Option<i32>,
}

/// What happened when a finished game was reported.
#[derive(Debug, Clone, Default, Getters)]
pub struct GameReport {
    stored: Option<StoredGame>,
    streak: i32,
    receipt: Option<NotifyReceipt>,
}

/// Failure to register a player.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    /// The address is not `local@domain.tld`.
    #[display("invalid email address '{_0}'")]
    #[from(ignore)]
    InvalidEmail(#[error(not(source))] String),
    /// Storing the player failed.
    #[display("{_0}")]
    Db(DbError),
}

/// Start time of the last reported game, with its report.
type LastReport = Arc<Mutex<Option<(DateTime<Utc>, GameReport)>>>;

/// One host's game session.
///
/// Clones share the engine and the reporting marker.
#[derive(Debug, Clone)]
pub struct GameSession {
    engine: SharedEngine,
    repository: Option<GameRepository>,
    notifier: Option<Notifier>,
    profile: Option<Profile>,
    last_report: LastReport,
}

impl GameSession {
    /// Creates a session around `engine` with no reporting.
    pub fn new(engine: SharedEngine) -> Self {
        Self {
            engine,
            repository: None,
            notifier: None,
            profile: None,
            last_report: LastReport::default(),
        }
    }

    /// Stores finished games in `repository`.
    pub fn with_repository(mut self, repository: GameRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Posts finished games through `notifier`.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// The engine this session drives.
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// The registered player, if any.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Report of the most recently finished game, if any.
    pub fn last_report(&self) -> Option<GameReport> {
        self.reported().as_ref().map(|(_, report)| report.clone())
    }

    /// Registers the player whose games are reported.
    ///
    /// With a repository attached the player is upserted by email.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the email is malformed or the player
    /// cannot be stored.
    #[instrument(skip(self))]
    pub fn register(&mut self, name: &str, email: &str) -> Result<&Profile, SessionError> {
        if !is_valid_email(email) {
            return Err(SessionError::InvalidEmail(email.to_string()));
        }
        let player_id = match &self.repository {
            Some(repository) => Some(*repository.upsert_player(name, email)?.id()),
            None => None,
        };
        info!(?player_id, "Player registered");
        Ok(self.profile.insert(Profile {
            name: name.to_string(),
            email: email.to_string(),
            player_id,
        }))
    }

    /// Starts a new game.
    pub fn new_game(&self, difficulty: Difficulty, human_player: Player) -> GameState {
        self.engine.new_game(difficulty, human_player)
    }

    /// Changes the difficulty of the current game.
    pub fn set_difficulty(&self, difficulty: Difficulty) {
        self.engine.set_difficulty(difficulty);
    }

    /// Current state of the game.
    pub fn current_state(&self) -> GameState {
        self.engine.current_state()
    }

    /// Plays the human's move, then reports the game if it ended.
    ///
    /// The computer's reply is searched on the calling task. Database writes
    /// for a finished game run on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError`] if the move is rejected.
    #[instrument(skip(self))]
    pub async fn play_turn(&self, position: Position) -> Result<GameState, TurnError> {
        let state = self.engine.play_turn(position)?;
        if state.is_game_over() {
            self.finish(&state).await;
        }
        Ok(state)
    }

    /// Lets the computer move, then reports the game if it ended.
    ///
    /// Runs the search inline, like [`GameSession::play_turn`].
    ///
    /// # Errors
    ///
    /// Returns [`TurnError`] if it is not the computer's turn.
    #[instrument(skip(self))]
    pub async fn computer_turn(&self) -> Result<GameState, TurnError> {
        let state = self.engine.play_computer_turn()?;
        if state.is_game_over() {
            self.finish(&state).await;
        }
        Ok(state)
    }

    fn reported(&self) -> MutexGuard<'_, Option<(DateTime<Utc>, GameReport)>> {
        self.last_report.lock().unwrap_or_else(|poisoned| {
            warn!("Report lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Records and announces a finished game, once.
    ///
    /// A game already reported by this session (or a clone of it) returns the
    /// earlier report and touches nothing.
    #[instrument(skip(self, state), fields(result = %state.result()))]
    async fn finish(&self, state: &GameState) -> GameReport {
        let started = state.start_time();
        {
            let mut last = self.reported();
            if let Some((_, report)) = last.as_ref().filter(|(at, _)| *at == started) {
                debug!("Game already reported");
                return report.clone();
            }
            *last = Some((started, GameReport::default()));
        }

        let report = self.deliver(state).await;
        if let Some((at, last)) = self.reported().as_mut()
            && *at == started
        {
            *last = report.clone();
        }
        report
    }

    async fn deliver(&self, state: &GameState) -> GameReport {
        let mut report = GameReport::default();
        let (Some(profile), Some(outcome)) = (&self.profile, state.outcome_for_human()) else {
            debug!("Nothing to report");
            return report;
        };
        let finished_at = Utc::now();

        if let (Some(repository), Some(player_id)) = (&self.repository, profile.player_id) {
            let repository = repository.clone();
            let game = state.clone();
            let recorded = tokio::task::spawn_blocking(move || {
                record(&repository, player_id, &game, finished_at)
            })
            .await;
            match recorded {
                Ok(Ok((stored, streak))) => {
                    report.stored = Some(stored);
                    report.streak = streak;
                }
                Ok(Err(e)) => warn!(error = %e, "Failed to record game"),
                Err(e) => warn!(error = %e, "Recording task failed"),
            }
        }

        if let Some(notifier) = &self.notifier {
            let payload = ResultPayload::new(
                profile.email.clone(),
                profile.name.clone(),
                outcome,
                state.difficulty(),
                state.duration_at(finished_at).num_seconds().max(0),
                finished_at,
                report.streak,
            );
            match notifier.send(&payload).await {
                Ok(receipt) => report.receipt = Some(receipt),
                Err(e) => warn!(error = %e, "Failed to send notification"),
            }
        }

        info!(%outcome, streak = report.streak, "Game reported");
        report
    }
}

fn record(
    repository: &GameRepository,
    player_id: i32,
    state: &GameState,
    finished_at: DateTime<Utc>,
) -> Result<(StoredGame, i32), DbError> {
    let stored = repository.save_game(NewGame::from_state(player_id, state, finished_at)?)?;
    let streak = repository
        .current_streak(player_id)?
        .map(|s| *s.wins_count())
        .unwrap_or(0);
    Ok((stored, streak))
}
