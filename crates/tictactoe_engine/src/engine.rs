//! Entry point for hosts: one engine per game in flight.

use crate::game::Game;
use crate::search::Ai;
use crate::state::{GameState, TurnError};
use crate::types::{Difficulty, Player, Position};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{instrument, warn};

/// Facade over the game state machine.
///
/// Hosts (UI bridge, CLI, persistence triggers) talk to the engine only
/// through these operations. An `Engine` has a single owner; see
/// [`SharedEngine`] when several call sites need the same game.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    game: Game,
}

impl Engine {
    /// Creates an engine with a fresh game.
    pub fn new(difficulty: Difficulty, human_player: Player) -> Self {
        Self {
            game: Game::new(difficulty, human_player),
        }
    }

    /// Creates an engine whose easy-tier choices follow `seed`.
    pub fn seeded(difficulty: Difficulty, human_player: Player, seed: u64) -> Self {
        Self {
            game: Game::with_ai(
                GameState::new(difficulty, human_player),
                Ai::with_seed(difficulty, seed),
            ),
        }
    }

    /// Discards the current game and starts a new one.
    #[instrument(skip(self))]
    pub fn new_game(&mut self, difficulty: Difficulty, human_player: Player) -> GameState {
        self.game.new_game(difficulty, human_player).clone()
    }

    /// Changes the tier for the remaining computer moves.
    #[instrument(skip(self))]
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.game.set_difficulty(difficulty);
    }

    /// Plays the human's move and the computer's answer.
    ///
    /// # Errors
    ///
    /// Returns the state machine's [`TurnError`] unchanged.
    #[instrument(skip(self))]
    pub fn play_turn(&mut self, position: Position) -> Result<GameState, TurnError> {
        self.game.apply_human_move(position)
    }

    /// Plays the computer's opening move when it holds X.
    ///
    /// # Errors
    ///
    /// [`TurnError::NotYourTurn`] if the human is to move,
    /// [`TurnError::GameOver`] once the game has ended.
    #[instrument(skip(self))]
    pub fn play_computer_turn(&mut self) -> Result<GameState, TurnError> {
        self.game.apply_computer_move()
    }

    /// Snapshot of the current game.
    pub fn current_state(&self) -> GameState {
        self.game.state().clone()
    }
}

/// Cloneable handle that serializes access to one [`Engine`].
///
/// Every operation takes the lock for its whole duration, so a human move
/// and the computer's answer are never interleaved with another caller.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    /// Wraps an engine for shared use.
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        // Engine operations never panic mid-update, so a poisoned lock still
        // guards a consistent state.
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Engine lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// See [`Engine::new_game`].
    pub fn new_game(&self, difficulty: Difficulty, human_player: Player) -> GameState {
        self.lock().new_game(difficulty, human_player)
    }

    /// See [`Engine::set_difficulty`].
    pub fn set_difficulty(&self, difficulty: Difficulty) {
        self.lock().set_difficulty(difficulty);
    }

    /// See [`Engine::play_turn`].
    ///
    /// # Errors
    ///
    /// Returns the engine's [`TurnError`] unchanged.
    pub fn play_turn(&self, position: Position) -> Result<GameState, TurnError> {
        self.lock().play_turn(position)
    }

    /// See [`Engine::play_computer_turn`].
    ///
    /// # Errors
    ///
    /// Returns the engine's [`TurnError`] unchanged.
    pub fn play_computer_turn(&self) -> Result<GameState, TurnError> {
        self.lock().play_computer_turn()
    }

    /// See [`Engine::current_state`].
    pub fn current_state(&self) -> GameState {
        self.lock().current_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_play_turn_passes_errors_through() {
        let mut engine = Engine::new(Difficulty::Hard, Player::X);
        engine.play_turn(Position::CENTER).expect("legal move");
        assert_eq!(engine.play_turn(Position::CENTER), Err(TurnError::Occupied));
    }

    #[test]
    fn test_current_state_tracks_moves() {
        let mut engine = Engine::new(Difficulty::Hard, Player::X);
        let returned = engine.play_turn(Position::CENTER).expect("legal move");
        assert_eq!(engine.current_state(), returned);
    }

    #[test]
    fn test_new_game_replaces_state() {
        let mut engine = Engine::new(Difficulty::Hard, Player::X);
        engine.play_turn(Position::CENTER).expect("legal move");
        let fresh = engine.new_game(Difficulty::Medium, Player::X);
        assert_eq!(fresh.turn_count(), 0);
        assert_eq!(engine.current_state().difficulty(), Difficulty::Medium);
    }

    #[test]
    fn test_shared_engine_serializes_turns() {
        let shared = SharedEngine::new(Engine::new(Difficulty::Hard, Player::X));
        let handles: Vec<_> = Position::ALL
            .into_iter()
            .map(|pos| {
                let engine = shared.clone();
                thread::spawn(move || engine.play_turn(pos))
            })
            .collect();
        for handle in handles {
            let _ = handle.join().expect("thread finished");
        }

        // Each accepted call adds a human mark and at most one reply, so the
        // board is always consistent with alternating play.
        let state = shared.current_state();
        let board = state.board();
        let x = board.count_of(Player::X);
        let o = board.count_of(Player::O);
        assert!(x == o || x == o + 1, "x={x} o={o}");
        assert!(board.winner().is_none_or(|(p, _)| p == Player::O));
    }
}
