//! Turn-validating state machine for a single game.
//!
//! States are `human-to-move`, `computer-to-move` and `game-over`. A human
//! move that leaves the computer to move is answered in the same call, so
//! outside a call the machine only rests in `human-to-move` or `game-over`,
//! except right after [`Game::new_game`] when the computer holds X and
//! has to open with [`Game::apply_computer_move`].

use crate::search::Ai;
use crate::state::{GameState, TurnError};
use crate::types::{Difficulty, Player, Position};
use tracing::{debug, info, instrument};

/// Tic-tac-toe game: current state plus the computer opponent.
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    ai: Ai,
}

impl Game {
    /// Starts a game with the given tier and human side.
    #[instrument]
    pub fn new(difficulty: Difficulty, human_player: Player) -> Self {
        Self::with_ai(GameState::new(difficulty, human_player), Ai::new(difficulty))
    }

    /// Builds a game around an existing state and opponent.
    ///
    /// The opponent is reconfigured for the state's difficulty.
    pub fn with_ai(state: GameState, mut ai: Ai) -> Self {
        ai.set_difficulty(state.difficulty());
        Self { state, ai }
    }

    /// Returns the current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Replaces the game with a fresh one: empty board, X to move.
    #[instrument(skip(self))]
    pub fn new_game(&mut self, difficulty: Difficulty, human_player: Player) -> &GameState {
        self.state = GameState::new(difficulty, human_player);
        self.ai.set_difficulty(difficulty);
        info!(%difficulty, human = %human_player, "New game started");
        &self.state
    }

    /// Changes the tier for later computer moves. The board is untouched.
    #[instrument(skip(self))]
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.ai.set_difficulty(difficulty);
        self.state.set_difficulty(difficulty);
    }

    /// Plays the human's mark at `position`, then the computer's reply if
    /// the game is still running.
    ///
    /// # Errors
    ///
    /// Checked in order: [`TurnError::GameOver`] once the game has ended,
    /// [`TurnError::NotYourTurn`] while the computer is to move, and
    /// [`TurnError::Occupied`] if the cell is taken. A rejected move leaves
    /// the state unchanged.
    #[instrument(skip(self))]
    pub fn apply_human_move(&mut self, position: Position) -> Result<GameState, TurnError> {
        if self.state.is_game_over() {
            debug!("Rejected: game over");
            return Err(TurnError::GameOver);
        }
        if !self.state.is_human_turn() {
            debug!("Rejected: not the human's turn");
            return Err(TurnError::NotYourTurn);
        }
        if !self.state.board().is_empty_at(position) {
            debug!("Rejected: cell occupied");
            return Err(TurnError::Occupied);
        }

        self.state = self.state.after(position, self.state.human_player());

        if self.state.is_computer_turn() {
            self.play_computer();
        }

        debug!(result = %self.state.result(), turn = self.state.turn_count(), "Turn complete");
        Ok(self.state.clone())
    }

    /// Lets the computer move when it is due, which only happens as the
    /// opening move of a game where the computer plays X.
    ///
    /// # Errors
    ///
    /// [`TurnError::GameOver`] once the game has ended, or
    /// [`TurnError::NotYourTurn`] while the human is to move.
    #[instrument(skip(self))]
    pub fn apply_computer_move(&mut self) -> Result<GameState, TurnError> {
        if self.state.is_game_over() {
            return Err(TurnError::GameOver);
        }
        if !self.state.is_computer_turn() {
            return Err(TurnError::NotYourTurn);
        }
        self.play_computer();
        Ok(self.state.clone())
    }

    fn play_computer(&mut self) {
        let computer = self.state.computer_player();
        if let Some(reply) = self.ai.best_position(self.state.board(), computer) {
            debug!(%reply, player = %computer, "Computer moves");
            self.state = self.state.after(reply, computer);
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Difficulty::default(), Player::FIRST)
    }
}
