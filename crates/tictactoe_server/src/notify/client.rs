//! HTTP client that delivers game results to the receiver.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::{NotifyError, ResultPayload, is_valid_email};

/// Receiver's acknowledgement of a posted result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReceipt {
    id: String,
    timestamp: DateTime<Utc>,
    email_sent: bool,
}

impl NotifyReceipt {
    pub(super) fn new(id: String, timestamp: DateTime<Utc>, email_sent: bool) -> Self {
        Self {
            id,
            timestamp,
            email_sent,
        }
    }
}

/// Posts [`ResultPayload`]s to a configured endpoint.
#[derive(Debug, Clone)]
pub struct Notifier {
    endpoint: String,
    client: reqwest::Client,
}

impl Notifier {
    /// Creates a notifier for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Endpoint results are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts a result and returns the receiver's receipt.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the address is malformed, the request
    /// fails, or the receiver answers with a non-success status.
    #[instrument(skip(self, payload), fields(endpoint = %self.endpoint, outcome = %payload.outcome()))]
    pub async fn send(&self, payload: &ResultPayload) -> Result<NotifyReceipt, NotifyError> {
        if !is_valid_email(payload.email()) {
            return Err(NotifyError::new(format!(
                "invalid email address '{}'",
                payload.email()
            )));
        }

        debug!("Posting game result");
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Receiver rejected result");
            return Err(NotifyError::new(format!(
                "receiver returned {}: {}",
                status, body
            )));
        }

        let receipt: NotifyReceipt = response.json().await?;
        info!(id = %receipt.id(), email_sent = receipt.email_sent(), "Result delivered");
        Ok(receipt)
    }
}
