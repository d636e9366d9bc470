//! Tier stepper — the next (tier, units) configuration one step away.

use crate::tier::{Capacity, DEMOTION_RESTART_UNITS, ScaleDirection};

/// Result of asking for one capacity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The next configuration, one unit (or one tier boundary) away.
    Stepped(Capacity),
    /// Already at the bottom of the lowest tier; scaling down is a no-op.
    AtFloor,
    /// Already at the top of the highest tier; cannot scale further up.
    AtCeiling,
}

/// Step the capacity by exactly one unit in the given direction.
///
/// Within a tier the unit count moves by one. At a boundary the hub crosses
/// tiers: stepping up from the tier maximum promotes to the next tier at one
/// unit, stepping down from one unit demotes to the previous tier at
/// [`DEMOTION_RESTART_UNITS`]. The lowest and highest tiers terminate the
/// chain with [`StepOutcome::AtFloor`] and [`StepOutcome::AtCeiling`].
pub fn step(capacity: Capacity, direction: ScaleDirection) -> StepOutcome {
    match direction {
        ScaleDirection::Up => {
            if capacity.units < capacity.tier.max_units() {
                StepOutcome::Stepped(Capacity::new(capacity.tier, capacity.units + 1))
            } else if let Some(next) = capacity.tier.next_up() {
                StepOutcome::Stepped(Capacity::new(next, 1))
            } else {
                StepOutcome::AtCeiling
            }
        }
        ScaleDirection::Down => {
            if capacity.units > 1 {
                StepOutcome::Stepped(Capacity::new(capacity.tier, capacity.units - 1))
            } else if let Some(prev) = capacity.tier.next_down() {
                StepOutcome::Stepped(Capacity::new(prev, DEMOTION_RESTART_UNITS))
            } else {
                StepOutcome::AtFloor
            }
        }
    }
}
