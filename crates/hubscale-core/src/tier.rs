//! Capacity tiers of the managed message hub.
//!
//! A hub is provisioned as a (tier, unit count) pair. Each tier carries a
//! fixed per-unit daily message allowance and a maximum unit count; tier
//! transitions only happen at the unit-count boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Unit count a hub lands on when it is demoted into a lower tier.
pub const DEMOTION_RESTART_UNITS: u32 = 9;

/// Ordered capacity tier of the hub. `S1 < S2 < S3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    S1,
    S2,
    S3,
}

impl Tier {
    /// Daily message allowance per provisioned unit.
    pub const fn daily_allowance(self) -> u64 {
        match self {
            Tier::S1 => 400_000,
            Tier::S2 => 6_000_000,
            Tier::S3 => 300_000_000,
        }
    }

    /// Maximum unit count purchasable in this tier.
    pub const fn max_units(self) -> u32 {
        match self {
            Tier::S1 => 200,
            Tier::S2 => 200,
            Tier::S3 => 10,
        }
    }

    /// The next tier up, if any.
    pub const fn next_up(self) -> Option<Tier> {
        match self {
            Tier::S1 => Some(Tier::S2),
            Tier::S2 => Some(Tier::S3),
            Tier::S3 => None,
        }
    }

    /// The next tier down, if any.
    pub const fn next_down(self) -> Option<Tier> {
        match self {
            Tier::S1 => None,
            Tier::S2 => Some(Tier::S1),
            Tier::S3 => Some(Tier::S2),
        }
    }

    /// The sku name as the control plane spells it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::S1 => "S1",
            Tier::S2 => "S2",
            Tier::S3 => "S3",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a sku name into a [`Tier`].
#[derive(Debug, Clone, Error)]
#[error("unknown capacity tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S1" => Ok(Tier::S1),
            "S2" => Ok(Tier::S2),
            "S3" => Ok(Tier::S3),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

/// Provisioned capacity of the hub: a tier plus a unit count within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub tier: Tier,
    pub units: u32,
}

impl Capacity {
    pub const fn new(tier: Tier, units: u32) -> Self {
        Self { tier, units }
    }

    /// Whether the unit count lies within the tier's valid range.
    pub const fn is_valid(&self) -> bool {
        self.units >= 1 && self.units <= self.tier.max_units()
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tier, self.units)
    }
}

/// Direction of a scaling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    Up,
    Down,
}

impl fmt::Display for ScaleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleDirection::Up => f.write_str("up"),
            ScaleDirection::Down => f.write_str("down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::S1 < Tier::S2);
        assert!(Tier::S2 < Tier::S3);
    }

    #[test]
    fn tier_chain_is_consistent() {
        assert_eq!(Tier::S1.next_up(), Some(Tier::S2));
        assert_eq!(Tier::S2.next_down(), Some(Tier::S1));
        assert_eq!(Tier::S3.next_up(), None);
        assert_eq!(Tier::S1.next_down(), None);
    }

    #[test]
    fn tier_round_trips_through_sku_name() {
        for tier in [Tier::S1, Tier::S2, Tier::S3] {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
        assert!("B1".parse::<Tier>().is_err());
    }

    #[test]
    fn capacity_validity() {
        assert!(Capacity::new(Tier::S1, 1).is_valid());
        assert!(Capacity::new(Tier::S1, 200).is_valid());
        assert!(!Capacity::new(Tier::S1, 0).is_valid());
        assert!(!Capacity::new(Tier::S3, 11).is_valid());
    }

    #[test]
    fn capacity_display() {
        assert_eq!(Capacity::new(Tier::S2, 3).to_string(), "S2-3");
    }
}
