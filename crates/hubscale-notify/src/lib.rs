//! hubscale-notify — best-effort email summaries of capacity changes.
//!
//! Notification failures never fail a run and never roll anything back;
//! the engine logs them and moves on. The only implementation talks to a
//! SendGrid-compatible mail API.

pub mod mail;

pub use mail::MailClient;

use thiserror::Error;

/// Errors raised while sending a notification. Always non-fatal upstream.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail request failed: {0}")]
    Request(String),

    #[error("mail API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Send a one-line summary of a change. Best-effort.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}
