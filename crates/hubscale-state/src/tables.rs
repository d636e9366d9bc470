//! redb table definitions for the hubscale lease store.

use redb::TableDefinition;

/// Lease records keyed by lease name (JSON-serialized [`crate::LeaseRecord`]).
pub const LEASES: TableDefinition<&str, &[u8]> = TableDefinition::new("leases");
