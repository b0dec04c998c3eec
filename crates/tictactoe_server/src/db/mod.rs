//! SQLite persistence for players, finished games and win streaks.

mod error;
mod models;
mod repository;
mod schema;

pub use error::{DbError, DbErrorKind};
pub use models::{LeaderboardEntry, NewGame, NewPlayer, Player, StoredGame, Streak};
pub use repository::GameRepository;
