//! hubscale-control — the boundary to the cloud control plane.
//!
//! The decision logic only ever sees two capabilities: read the hub's
//! current capacity and usage, and apply a new capacity. Both are traits
//! here, with the Azure Resource Manager implementation in [`arm`] and the
//! token acquisition it depends on in [`auth`]. Tests substitute in-memory
//! fakes for the traits; nothing in the engine knows about HTTP.

pub mod arm;
pub mod auth;
pub mod error;

#[cfg(test)]
mod testserver;

pub use arm::ArmHubClient;
pub use auth::AadCredential;
pub use error::{ControlError, ControlResult};

use hubscale_core::Capacity;

/// Current state of the hub as the control plane reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubState {
    /// Provisioned capacity (tier and unit count).
    pub capacity: Capacity,
    /// Messages consumed in the current metering period.
    pub total_messages: u64,
}

/// Read the hub's provisioned capacity and usage snapshot.
#[allow(async_fn_in_trait)]
pub trait HubReader {
    async fn read(&self) -> ControlResult<HubState>;
}

/// Apply a new capacity to the hub. Fully applied before returning.
#[allow(async_fn_in_trait)]
pub trait HubWriter {
    async fn apply(&self, capacity: Capacity) -> ControlResult<()>;
}
