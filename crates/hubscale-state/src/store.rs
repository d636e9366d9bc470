//! LeaseStore — redb-backed single-flight lease persistence.
//!
//! All operations are read-modify-write inside a single write transaction,
//! so two processes racing for the same lease on one database observe a
//! consistent winner.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::LEASES;
use crate::types::LeaseRecord;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe lease store backed by redb.
#[derive(Clone)]
pub struct LeaseStore {
    db: Arc<Database>,
}

impl LeaseStore {
    /// Open (or create) a persistent lease store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "lease store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory lease store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory lease store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(LEASES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Try to take the named lease for `holder`.
    ///
    /// Succeeds when no lease exists, when the existing lease is stale
    /// (unrenewed for longer than `ttl_secs`), or when `holder` already
    /// owns it (which counts as a renewal). Returns whether the lease is
    /// now held by `holder`.
    pub fn try_acquire(&self, name: &str, holder: &str, ttl_secs: u64) -> StateResult<bool> {
        self.try_acquire_at(name, holder, ttl_secs, epoch_secs())
    }

    /// Acquire with an explicit clock (for testing).
    pub fn try_acquire_at(
        &self,
        name: &str,
        holder: &str,
        ttl_secs: u64,
        now: u64,
    ) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let acquired;
        {
            let mut table = txn.open_table(LEASES).map_err(map_err!(Table))?;
            let existing: Option<LeaseRecord> = match table.get(name).map_err(map_err!(Read))? {
                Some(guard) => Some(
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?,
                ),
                None => None,
            };

            let record = match existing {
                Some(lease) if lease.holder == holder => {
                    // Re-acquiring our own lease just refreshes it.
                    Some(LeaseRecord {
                        renewed_at: now,
                        ..lease
                    })
                }
                Some(lease) if lease.is_stale(ttl_secs, now) => {
                    debug!(
                        %name,
                        previous = %lease.holder,
                        "taking over stale lease"
                    );
                    Some(LeaseRecord {
                        name: name.to_string(),
                        holder: holder.to_string(),
                        acquired_at: now,
                        renewed_at: now,
                    })
                }
                Some(_) => None,
                None => Some(LeaseRecord {
                    name: name.to_string(),
                    holder: holder.to_string(),
                    acquired_at: now,
                    renewed_at: now,
                }),
            };

            acquired = match record {
                Some(record) => {
                    let value =
                        serde_json::to_vec(&record).map_err(map_err!(Serialize))?;
                    table
                        .insert(name, value.as_slice())
                        .map_err(map_err!(Write))?;
                    true
                }
                None => false,
            };
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(acquired)
    }

    /// Refresh the renewal timestamp of a lease we hold.
    ///
    /// Returns false if the lease no longer exists or belongs to someone
    /// else — the caller has lost it and should stop.
    pub fn renew(&self, name: &str, holder: &str) -> StateResult<bool> {
        self.renew_at(name, holder, epoch_secs())
    }

    /// Renew with an explicit clock (for testing).
    pub fn renew_at(&self, name: &str, holder: &str, now: u64) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let renewed;
        {
            let mut table = txn.open_table(LEASES).map_err(map_err!(Table))?;
            let existing: Option<LeaseRecord> = match table.get(name).map_err(map_err!(Read))? {
                Some(guard) => Some(
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?,
                ),
                None => None,
            };

            renewed = match existing {
                Some(lease) if lease.holder == holder => {
                    let record = LeaseRecord {
                        renewed_at: now,
                        ..lease
                    };
                    let value =
                        serde_json::to_vec(&record).map_err(map_err!(Serialize))?;
                    table
                        .insert(name, value.as_slice())
                        .map_err(map_err!(Write))?;
                    true
                }
                _ => false,
            };
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(renewed)
    }

    /// Release a lease we hold. Releasing someone else's lease is a no-op.
    pub fn release(&self, name: &str, holder: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let released;
        {
            let mut table = txn.open_table(LEASES).map_err(map_err!(Table))?;
            let ours = match table.get(name).map_err(map_err!(Read))? {
                Some(guard) => {
                    let lease: LeaseRecord = serde_json::from_slice(guard.value())
                        .map_err(map_err!(Deserialize))?;
                    lease.holder == holder
                }
                None => false,
            };
            released = if ours {
                table.remove(name).map_err(map_err!(Write))?;
                true
            } else {
                false
            };
        }
        txn.commit().map_err(map_err!(Transaction))?;
        if released {
            debug!(%name, %holder, "lease released");
        }
        Ok(released)
    }

    /// Get the current lease record, if any.
    pub fn get(&self, name: &str) -> StateResult<Option<LeaseRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(LEASES).map_err(map_err!(Table))?;
        match table.get(name).map_err(map_err!(Read))? {
            Some(guard) => {
                let lease: LeaseRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(lease))
            }
            None => Ok(None),
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
