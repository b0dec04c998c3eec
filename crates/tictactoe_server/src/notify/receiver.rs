//! HTTP receiver for game results.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use derive_getters::Getters;
use tictactoe_engine::Outcome;
use tracing::{info, instrument, warn};

use super::{NotifyError, NotifyReceipt, ResultPayload, is_valid_email};

/// A composed message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Email {
    from: String,
    to: String,
    subject: String,
    body: String,
}

/// Delivers composed emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message.
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Mailer that only logs each delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Builds the message for a result.
pub fn compose(payload: &ResultPayload, from: &str) -> Email {
    let (label, verb) = match payload.outcome() {
        Outcome::Win => ("Win", "won"),
        Outcome::Loss => ("Loss", "lost"),
        Outcome::Draw => ("Draw", "drew"),
    };
    let mut body = format!(
        "Hi {}!\n\nYou {} on {} difficulty.",
        payload.player_name(),
        verb,
        payload.difficulty()
    );
    if *payload.streak() > 1 {
        body.push_str(&format!("\nCurrent win streak: {}.", payload.streak()));
    }
    Email {
        from: from.to_string(),
        to: payload.email().clone(),
        subject: format!("Tic-Tac-Toe: {}", label),
        body,
    }
}

/// Shared state of the receiver routes.
#[derive(Clone)]
pub struct ReceiverState {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl ReceiverState {
    /// Creates receiver state sending from `from` through `mailer`.
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
        }
    }
}

/// Routes: `POST /api/games`.
pub fn router(state: ReceiverState) -> Router {
    Router::new()
        .route("/api/games", post(receive_game))
        .with_state(state)
}

#[instrument(skip_all)]
async fn receive_game(
    State(state): State<ReceiverState>,
    Json(payload): Json<ResultPayload>,
) -> Response {
    if !is_valid_email(payload.email()) {
        warn!(email = %payload.email(), "Rejected result with invalid email");
        return (StatusCode::BAD_REQUEST, "Invalid email").into_response();
    }

    let now = Utc::now();
    let email = compose(&payload, &state.from);
    let email_sent = match state.mailer.send(&email).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Email failed");
            false
        }
    };

    let receipt = NotifyReceipt::new(now.timestamp_millis().to_string(), now, email_sent);
    Json(receipt).into_response()
}
