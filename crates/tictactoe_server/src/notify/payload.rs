//! Wire format of a game-result notification.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tictactoe_engine::{Difficulty, Outcome};

/// Body posted to the receiver when a game ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    email: String,
    player_name: String,
    outcome: Outcome,
    difficulty: Difficulty,
    /// Game length in seconds.
    duration: i64,
    played_at: DateTime<Utc>,
    /// Wins in the player's open streak after this game.
    streak: i32,
}

/// Checks for a `local@domain.tld` shape with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len(),
        None => false,
    }
}
