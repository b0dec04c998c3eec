//! Tic-tac-toe engine with a minimax opponent.
//!
//! # Architecture
//!
//! - **Board**: immutable 3x3 grid with win/draw detection
//! - **Search**: depth-bounded minimax with alpha-beta pruning
//! - **Game**: turn-validating state machine for one game
//! - **Engine**: facade hosts call (`new_game`, `set_difficulty`,
//!   `play_turn`, `current_state`)
//!
//! # Example
//!
//! ```
//! use tictactoe_engine::{Difficulty, Engine, Player, Position};
//!
//! let mut engine = Engine::new(Difficulty::Hard, Player::X);
//! let state = engine.play_turn(Position::CENTER).unwrap();
//! // The computer answered in the same call.
//! assert_eq!(state.turn_count(), 2);
//! assert!(state.is_human_turn());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod engine;
mod game;
mod search;
mod state;
mod types;

pub use board::{Board, BoardParseError, WINNING_LINES, WinningLine};
pub use engine::{Engine, SharedEngine};
pub use game::Game;
pub use search::{Ai, minimax, search};
pub use state::{GameState, TurnError};
pub use types::{Difficulty, GameResult, Outcome, Player, Position};
