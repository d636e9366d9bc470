//! Threshold evaluator — the message count at which a scaling run triggers.

use crate::tier::{Capacity, ScaleDirection};

/// Compute the message-count limit for a capacity and threshold percentage.
///
/// The per-unit daily allowance comes from the tier table, with one wrinkle:
/// S2 and S3 sell their first unit as a "shared" unit, which for threshold
/// purposes behaves like 10 units of the tier below. The scale-down variant
/// multiplies by one unit fewer than is provisioned, so that a hub only
/// shrinks when its usage would still fit after the step — the two
/// directions intentionally use different formulas.
///
/// The result is floor(allowance * effective_units * percent / 100).
pub fn message_limit(capacity: Capacity, percent: u8, direction: ScaleDirection) -> u64 {
    let (allowance, units) = effective_capacity(capacity);
    let units = match direction {
        ScaleDirection::Up => units,
        ScaleDirection::Down => units.saturating_sub(1),
    };
    allowance * units * u64::from(percent) / 100
}

/// Resolve the shared-first-unit case into (allowance, effective units).
fn effective_capacity(capacity: Capacity) -> (u64, u64) {
    if capacity.units == 1
        && let Some(lower) = capacity.tier.next_down()
    {
        return (lower.daily_allowance(), 10);
    }
    (capacity.tier.daily_allowance(), u64::from(capacity.units))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;

    #[test]
    fn plain_tier_limit() {
        // S1 has no shared first unit: straight allowance * units * percent.
        let limit = message_limit(Capacity::new(Tier::S1, 199), 1, ScaleDirection::Up);
        assert_eq!(limit, 400_000 * 199 / 100);
    }

    #[test]
    fn shared_first_unit_uses_lower_allowance() {
        // S2 at one unit counts as 10 units of S1 allowance.
        let limit = message_limit(Capacity::new(Tier::S2, 1), 100, ScaleDirection::Up);
        assert_eq!(limit, 400_000 * 10);

        let limit = message_limit(Capacity::new(Tier::S3, 1), 100, ScaleDirection::Up);
        assert_eq!(limit, 6_000_000 * 10);
    }

    #[test]
    fn scale_down_subtracts_one_unit() {
        let up = message_limit(Capacity::new(Tier::S1, 4), 50, ScaleDirection::Up);
        let down = message_limit(Capacity::new(Tier::S1, 4), 50, ScaleDirection::Down);
        assert_eq!(up, 400_000 * 4 * 50 / 100);
        assert_eq!(down, 400_000 * 3 * 50 / 100);
    }

    #[test]
    fn scale_down_shared_first_unit() {
        // Scenario: S2 at one unit, 90% — 400_000 * (10 - 1) * 90 / 100.
        let limit = message_limit(Capacity::new(Tier::S2, 1), 90, ScaleDirection::Down);
        assert_eq!(limit, 3_240_000);
    }

    #[test]
    fn scale_down_single_plain_unit_is_zero() {
        // (S1, 1) down: one effective unit minus one leaves nothing.
        let limit = message_limit(Capacity::new(Tier::S1, 1), 90, ScaleDirection::Down);
        assert_eq!(limit, 0);
    }

    #[test]
    fn monotone_in_percent() {
        let cap = Capacity::new(Tier::S2, 5);
        let mut last = 0;
        for percent in 0..=100 {
            let limit = message_limit(cap, percent, ScaleDirection::Up);
            assert!(limit >= last, "limit decreased at percent {percent}");
            last = limit;
        }
    }

    #[test]
    fn monotone_in_units() {
        // Skip units=1, which the shared-first-unit rule treats specially.
        for direction in [ScaleDirection::Up, ScaleDirection::Down] {
            let mut last = 0;
            for units in 2..=Tier::S2.max_units() {
                let limit = message_limit(Capacity::new(Tier::S2, units), 80, direction);
                assert!(limit >= last, "limit decreased at {units} units");
                last = limit;
            }
        }
    }

    #[test]
    fn zero_percent_is_zero_limit() {
        assert_eq!(
            message_limit(Capacity::new(Tier::S3, 10), 0, ScaleDirection::Up),
            0
        );
    }
}
