//! hubscale-core — capacity tiers and scaling decision logic.
//!
//! The decision logic is deliberately free of I/O: given the hub's current
//! (tier, units) and a consumed-message snapshot, it answers two questions —
//! what message count crosses the scaling threshold, and what the next
//! (tier, units) configuration one step up or down looks like. Everything
//! that touches the control plane lives behind the boundary traits in
//! `hubscale-control`.
//!
//! # Decision shape
//!
//! ```text
//! limit = allowance(tier, units) * effective_units * percent / 100
//!
//! scale down triggers when usage <= limit   (capacity is going to waste)
//! scale up   triggers when usage >= limit   (capacity is running out)
//! ```

pub mod config;
pub mod step;
pub mod threshold;
pub mod tier;

pub use config::{AuthConfig, ConfigError, HubConfig, HubscaleConfig, JobConfig, NotifyConfig};
pub use step::{StepOutcome, step};
pub use threshold::message_limit;
pub use tier::{Capacity, DEMOTION_RESTART_UNITS, ScaleDirection, Tier};
