//! JSON-lines bridge for embedding hosts.
//!
//! Each input line is one request, each output line one reply:
//!
//! ```text
//! {"op":"newGame","difficulty":"hard","humanPlayer":"X"}
//! {"op":"setDifficulty","difficulty":"easy"}
//! {"op":"playTurn","row":1,"col":1}
//! {"op":"computerTurn"}
//! {"op":"getState"}
//! ```
//!
//! Replies carry `state` (a [`GameSnapshot`]), `error` (a short code) and,
//! for `setDifficulty`, the new `difficulty`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tictactoe_engine::{Difficulty, GameState, Player, Position, TurnError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use crate::session::GameSession;
use crate::snapshot::GameSnapshot;

/// Error code for an unknown difficulty name.
pub const INVALID_DIFFICULTY: &str = "invalidDifficulty";
/// Error code for coordinates off the grid.
pub const INVALID_POSITION: &str = "invalidPosition";
/// Error code for a line that is not a request.
pub const INVALID_REQUEST: &str = "invalidRequest";

/// One bridge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BridgeRequest {
    /// Start over, optionally changing tier and side.
    NewGame {
        /// Tier name; keeps the current tier when absent.
        #[serde(default)]
        difficulty: Option<String>,
        /// Human side; keeps the current side when absent.
        #[serde(default)]
        human_player: Option<Player>,
    },
    /// Change the tier of the current game.
    SetDifficulty {
        /// Tier name.
        difficulty: String,
    },
    /// Human move.
    PlayTurn {
        /// Row, 0-2.
        row: i64,
        /// Column, 0-2.
        col: i64,
    },
    /// Computer move, for games where the computer opens.
    ComputerTurn,
    /// Read the current state.
    GetState,
}

/// One bridge reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeReply {
    /// Game state after the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<GameSnapshot>,
    /// Error code when the request was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Tier in effect after `setDifficulty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl BridgeReply {
    fn state(state: &GameState) -> Self {
        Self {
            state: Some(GameSnapshot::from(state)),
            ..Self::default()
        }
    }

    fn error(code: &str) -> Self {
        Self {
            error: Some(code.to_string()),
            ..Self::default()
        }
    }
}

/// Serves bridge requests against one session.
#[derive(Debug, Clone)]
pub struct Bridge {
    session: GameSession,
}

impl Bridge {
    /// Creates a bridge over `session`.
    pub fn new(session: GameSession) -> Self {
        Self { session }
    }

    /// The session requests are applied to.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Applies one request.
    #[instrument(skip(self))]
    pub async fn handle(&self, request: BridgeRequest) -> BridgeReply {
        match request {
            BridgeRequest::NewGame {
                difficulty,
                human_player,
            } => {
                let current = self.session.current_state();
                let difficulty = match difficulty {
                    Some(name) => match Difficulty::from_str(&name) {
                        Ok(d) => d,
                        Err(_) => return BridgeReply::error(INVALID_DIFFICULTY),
                    },
                    None => current.difficulty(),
                };
                let human = human_player.unwrap_or_else(|| current.human_player());
                BridgeReply::state(&self.session.new_game(difficulty, human))
            }
            BridgeRequest::SetDifficulty { difficulty } => {
                match Difficulty::from_str(&difficulty) {
                    Ok(d) => {
                        self.session.set_difficulty(d);
                        BridgeReply {
                            difficulty: Some(d),
                            ..BridgeReply::state(&self.session.current_state())
                        }
                    }
                    Err(_) => BridgeReply::error(INVALID_DIFFICULTY),
                }
            }
            BridgeRequest::PlayTurn { row, col } => {
                let Some(position) = Position::checked(row, col) else {
                    return BridgeReply::error(INVALID_POSITION);
                };
                turn_reply(self.session.play_turn(position).await)
            }
            BridgeRequest::ComputerTurn => turn_reply(self.session.computer_turn().await),
            BridgeRequest::GetState => BridgeReply::state(&self.session.current_state()),
        }
    }

    /// Parses and applies one input line.
    pub async fn handle_line(&self, line: &str) -> BridgeReply {
        match serde_json::from_str::<BridgeRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "Unparseable request");
                BridgeReply::error(INVALID_REQUEST)
            }
        }
    }

    /// Reads requests from `reader` until end of input, writing one reply
    /// line per non-blank request line.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading or writing fails.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Bridge started");
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!(line = %line, "Request received");
            let reply = self.handle_line(&line).await;
            let mut out = serde_json::to_string(&reply)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
        info!("Bridge input closed");
        Ok(())
    }
}

fn turn_reply(result: Result<GameState, TurnError>) -> BridgeReply {
    match result {
        Ok(state) => BridgeReply::state(&state),
        Err(e) => BridgeReply::error(e.code()),
    }
}
