//! Result notifications.
//!
//! The [`Notifier`] posts a [`ResultPayload`] to a receiver when a recorded
//! game ends. The receiver side ([`router`]) validates the address, composes
//! an [`Email`] and hands it to a [`Mailer`].

mod client;
mod error;
mod payload;
mod receiver;

pub use client::{Notifier, NotifyReceipt};
pub use error::NotifyError;
pub use payload::{ResultPayload, is_valid_email};
pub use receiver::{Email, Mailer, ReceiverState, TracingMailer, compose, router};
