//! Host application for the tic-tac-toe engine.
//!
//! # Architecture
//!
//! - **Config**: TOML file plus environment overrides
//! - **Database**: players, finished games and win streaks in SQLite
//! - **Notify**: result notifications over HTTP, and the receiver that
//!   turns them into email
//! - **Session**: drives a shared engine and reports finished games
//! - **Bridge**: JSON-lines protocol for embedding hosts
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_server::{AppConfig, GameRepository, GameSession};
//! use tictactoe_engine::{Engine, SharedEngine};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let repository = GameRepository::new(config.database_path().clone())?;
//! repository.run_migrations()?;
//!
//! let engine = SharedEngine::new(Engine::new(*config.difficulty(), *config.human_player()));
//! let mut session = GameSession::new(engine).with_repository(repository);
//! session.register("Ann", "ann@example.com")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bridge;
mod config;
mod db;
mod notify;
mod session;
mod snapshot;

pub use bridge::{
    Bridge, BridgeReply, BridgeRequest, INVALID_DIFFICULTY, INVALID_POSITION, INVALID_REQUEST,
};
pub use config::{AppConfig, ConfigError, DATABASE_ENV, DIFFICULTY_ENV, NOTIFY_URL_ENV};
pub use db::{
    DbError, DbErrorKind, GameRepository, LeaderboardEntry, NewGame, NewPlayer, Player,
    StoredGame, Streak,
};
pub use notify::{
    Email, Mailer, Notifier, NotifyError, NotifyReceipt, ReceiverState, ResultPayload,
    TracingMailer, compose, is_valid_email, router,
};
pub use session::{GameReport, GameSession, Profile, SessionError};
pub use snapshot::GameSnapshot;
