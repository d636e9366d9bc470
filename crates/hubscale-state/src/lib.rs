//! hubscale-state — embedded single-flight lease store.
//!
//! Backed by [redb](https://docs.rs/redb). The watch loop's "at most one
//! active instance" guarantee is an explicit lease record with a fixed
//! name, a holder identity, and a renewal timestamp. A lease whose renewal
//! is older than its time-to-live is stale and can be taken over.
//!
//! The `LeaseStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and supports both on-disk and in-memory backends, the latter for tests.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::LeaseStore;
pub use types::LeaseRecord;
