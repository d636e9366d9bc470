//! Error types for control-plane operations.

use thiserror::Error;

/// Result type alias for control-plane operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors crossing the control-plane boundary.
///
/// Read-side and write-side failures are distinct variants on purpose: a
/// failed read means nothing was touched, a failed write means the capacity
/// change did not apply, and the two are logged differently.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("hub read failed: {0}")]
    Read(String),

    #[error("usage metric missing: hub reported no TotalMessages quota metric")]
    UsageMetricMissing,

    #[error("hub update failed: {0}")]
    Write(String),
}
