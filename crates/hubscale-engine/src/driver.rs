//! Scale-decision driver — one evaluation cycle, read to notify.

use tracing::{info, warn};

use hubscale_control::{ControlResult, HubReader, HubWriter};
use hubscale_core::{Capacity, ScaleDirection, StepOutcome, message_limit, step};
use hubscale_notify::Notifier;

/// What a single evaluation cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Usage did not cross the threshold; nothing was touched.
    NoAction { usage: u64, limit: u64 },
    /// The threshold was crossed but the capacity is already at the end of
    /// the tier chain. A legitimate terminal outcome, not an error.
    AtBoundary { capacity: Capacity },
    /// A new capacity was submitted to the control plane.
    Scaled { from: Capacity, to: Capacity },
}

/// Drives one scaling run against the boundary traits.
///
/// Generic over the reader, writer, and notifier so tests can substitute
/// in-memory fakes. The notifier is optional; runs work without email.
pub struct ScaleDriver<R, W, N> {
    reader: R,
    writer: W,
    notifier: Option<N>,
    hub_name: String,
    threshold_percent: u8,
}

impl<R: HubReader, W: HubWriter, N: Notifier> ScaleDriver<R, W, N> {
    pub fn new(
        reader: R,
        writer: W,
        notifier: Option<N>,
        hub_name: impl Into<String>,
        threshold_percent: u8,
    ) -> Self {
        Self {
            reader,
            writer,
            notifier,
            hub_name: hub_name.into(),
            threshold_percent,
        }
    }

    /// Perform one evaluation cycle in the given direction.
    ///
    /// Scale-down triggers when usage has fallen to or below the limit;
    /// scale-up triggers when usage has reached or passed it. Both
    /// comparisons are inclusive.
    pub async fn run_once(&self, direction: ScaleDirection) -> ControlResult<RunOutcome> {
        let state = self.reader.read().await?;
        let usage = state.total_messages;
        let limit = message_limit(state.capacity, self.threshold_percent, direction);

        info!(
            hub = %self.hub_name,
            capacity = %state.capacity,
            usage,
            limit,
            percent = self.threshold_percent,
            %direction,
            "evaluated scaling threshold"
        );

        let triggered = match direction {
            ScaleDirection::Down => usage <= limit,
            ScaleDirection::Up => usage >= limit,
        };
        if !triggered {
            info!(hub = %self.hub_name, usage, limit, "threshold not crossed, nothing to do");
            return Ok(RunOutcome::NoAction { usage, limit });
        }

        let target = match step(state.capacity, direction) {
            StepOutcome::Stepped(target) => target,
            StepOutcome::AtFloor | StepOutcome::AtCeiling => {
                info!(
                    hub = %self.hub_name,
                    capacity = %state.capacity,
                    %direction,
                    "already at the end of the tier chain, cannot step further"
                );
                return Ok(RunOutcome::AtBoundary {
                    capacity: state.capacity,
                });
            }
        };

        self.writer.apply(target).await?;
        info!(
            hub = %self.hub_name,
            from = %state.capacity,
            to = %target,
            "hub capacity changed"
        );

        if let Some(notifier) = &self.notifier {
            let subject = format!("{} scaled {} to {}", self.hub_name, direction, target);
            let body = format!(
                "Capacity for {} changed from {} to {} (usage {} against limit {}).",
                self.hub_name, state.capacity, target, usage, limit
            );
            if let Err(e) = notifier.send(&subject, &body).await {
                // The capacity change is already applied; never roll back.
                warn!(hub = %self.hub_name, error = %e, "notification failed");
            }
        }

        Ok(RunOutcome::Scaled {
            from: state.capacity,
            to: target,
        })
    }
}
