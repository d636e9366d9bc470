//! hubscale-engine — runs scaling decisions against the hub.
//!
//! The [`driver::ScaleDriver`] performs one evaluation cycle: read the hub,
//! compare usage against the threshold, maybe step the capacity and submit
//! it, maybe email about it. The [`watch::WatchLoop`] repeats the scale-up
//! cycle on an interval, guarded by a persisted single-flight lease so at
//! most one loop is active per lease database.
//!
//! # Run shape
//!
//! ```text
//! read -> evaluate -> (no action | at boundary | apply + notify)
//! ```
//!
//! Read failures abort before anything is touched. A write failure is fatal
//! to the run. A notification failure is logged and swallowed — the capacity
//! change has already been applied and is never rolled back.

pub mod driver;
pub mod watch;

#[cfg(test)]
pub(crate) mod testutil;

pub use driver::{RunOutcome, ScaleDriver};
pub use watch::{WATCH_LEASE_NAME, WatchLoop};
