//! Computer opponent: depth-bounded minimax with alpha-beta pruning.
//!
//! Scores are from the computer's point of view. A win is worth
//! `10 + remaining depth` and a loss `-10 - remaining depth`, so among
//! winning lines the quickest is preferred and among losing lines the
//! slowest. Anything else at the horizon or on a full board scores 0.
//!
//! Depth 0 skips the search entirely and plays a random legal move.

use crate::board::Board;
use crate::types::{Difficulty, Player, Position};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

const WIN_SCORE: i32 = 10;

/// Move selector for the computer player.
#[derive(Debug, Clone)]
pub struct Ai {
    max_depth: u32,
    rng: StdRng,
}

impl Ai {
    /// Creates an opponent for the given tier, seeded from the OS.
    #[instrument]
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            max_depth: difficulty.max_depth(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates an opponent whose random choices are reproducible.
    #[instrument]
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            max_depth: difficulty.max_depth(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reconfigures the search depth for a new tier.
    #[instrument(skip(self))]
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.max_depth = difficulty.max_depth();
        debug!(max_depth = self.max_depth, "Search depth updated");
    }

    /// Current search depth bound.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Picks a move for `player` on `board`.
    ///
    /// Returns `None` only when the board has no empty cell.
    #[instrument(skip(self, board), fields(max_depth = self.max_depth, turn = board.turn_count()))]
    pub fn best_position(&mut self, board: &Board, player: Player) -> Option<Position> {
        let moves = board.empty_positions();
        if moves.is_empty() {
            return None;
        }
        if self.max_depth == 0 {
            let choice = moves.choose(&mut self.rng).copied();
            debug!(?choice, "Random move");
            return choice;
        }
        let choice = search(board, player, self.max_depth);
        debug!(?choice, "Searched move");
        choice
    }
}

/// Runs the root of the search and returns the first best-scoring move.
///
/// Candidates are tried in row-major order and a later move only replaces
/// the current best on a strictly greater score.
pub fn search(board: &Board, player: Player, max_depth: u32) -> Option<Position> {
    let mut best: Option<(Position, i32)> = None;
    let mut alpha = i32::MIN;

    for pos in board.empties() {
        let score = minimax(
            &board.with_mark(pos, player),
            max_depth.saturating_sub(1),
            false,
            alpha,
            i32::MAX,
            player,
        );
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
            alpha = alpha.max(score);
        }
    }

    best.map(|(pos, _)| pos)
}

/// Minimax value of `board` with `depth` plies left.
///
/// `maximizing` is true when `ai` is to move. `alpha`/`beta` bound the
/// window; a subtree is cut as soon as `beta <= alpha`.
pub fn minimax(
    board: &Board,
    depth: u32,
    maximizing: bool,
    mut alpha: i32,
    mut beta: i32,
    ai: Player,
) -> i32 {
    if let Some((winner, _)) = board.winner() {
        let margin = WIN_SCORE + depth as i32;
        return if winner == ai { margin } else { -margin };
    }
    if board.is_full() || depth == 0 {
        return 0;
    }

    let to_move = if maximizing { ai } else { ai.opponent() };

    if maximizing {
        let mut best = i32::MIN;
        for pos in board.empties() {
            let score = minimax(&board.with_mark(pos, to_move), depth - 1, false, alpha, beta, ai);
            best = best.max(score);
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = i32::MAX;
        for pos in board.empties() {
            let score = minimax(&board.with_mark(pos, to_move), depth - 1, true, alpha, beta, ai);
            best = best.min(score);
            beta = beta.min(best);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}
