//! Watch loop — the self-rescheduling scale-up job.
//!
//! A plain interval loop guarded by a persisted lease: the loop only runs
//! while it holds the fixed-name lease, renews it going into every cycle,
//! and releases it on shutdown. A crashed holder's lease goes stale after
//! twice the interval and can be taken over, so a dead process never
//! wedges the system. A cycle that stalls past that TTL can briefly
//! overlap with a takeover; the stalled holder sees the loss at its next
//! renewal and stops.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use hubscale_control::{HubReader, HubWriter};
use hubscale_core::ScaleDirection;
use hubscale_notify::Notifier;
use hubscale_state::LeaseStore;

use crate::driver::ScaleDriver;

/// Fixed lease name: one watch loop system-wide.
pub const WATCH_LEASE_NAME: &str = "hubscale-watch";

/// Periodically runs the scale-up cycle while holding the watch lease.
pub struct WatchLoop<R, W, N> {
    driver: ScaleDriver<R, W, N>,
    lease: LeaseStore,
    holder: String,
    interval: Duration,
}

impl<R: HubReader, W: HubWriter, N: Notifier> WatchLoop<R, W, N> {
    pub fn new(
        driver: ScaleDriver<R, W, N>,
        lease: LeaseStore,
        holder: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            driver,
            lease,
            holder: holder.into(),
            interval,
        }
    }

    /// Run until shutdown, or return immediately if another instance holds
    /// the lease. Cycle errors are logged and the loop keeps going — each
    /// run is independent.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        // A lease is stale once it outlives two intervals without renewal.
        let ttl_secs = self.interval.as_secs() * 2;

        if !self
            .lease
            .try_acquire(WATCH_LEASE_NAME, &self.holder, ttl_secs)?
        {
            info!(
                holder = %self.holder,
                "another watch loop holds the lease, nothing to do"
            );
            return Ok(());
        }

        info!(
            holder = %self.holder,
            interval_secs = self.interval.as_secs(),
            "watch loop started"
        );

        loop {
            // Renew going into the cycle: the TTL then covers the whole
            // run, and a lease lost to a takeover stops us before the
            // next cycle starts.
            if !self.lease.renew(WATCH_LEASE_NAME, &self.holder)? {
                warn!(holder = %self.holder, "watch lease lost, stopping");
                return Ok(());
            }

            match self.driver.run_once(ScaleDirection::Up).await {
                Ok(outcome) => debug!(?outcome, "watch cycle complete"),
                Err(e) => error!(error = %e, "watch cycle failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    info!("watch loop shutting down");
                    break;
                }
            }
        }

        self.lease.release(WATCH_LEASE_NAME, &self.holder)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeHub, FakeNotifier};
    use hubscale_core::Tier;

    fn watch_loop(hub: &FakeHub, lease: LeaseStore, holder: &str) -> WatchLoop<FakeHub, FakeHub, FakeNotifier> {
        let driver = ScaleDriver::new(
            hub.clone(),
            hub.clone(),
            Some(FakeNotifier::default()),
            "test-hub",
            1,
        );
        WatchLoop::new(driver, lease, holder, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn runs_one_cycle_then_releases_on_shutdown() {
        let hub = FakeHub::with_state(Tier::S1, 5, 0);
        let lease = LeaseStore::open_in_memory().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Signal shutdown up front: the loop still completes its first
        // cycle before noticing.
        shutdown_tx.send(true).unwrap();

        watch_loop(&hub, lease.clone(), "a").run(shutdown_rx).await.unwrap();

        assert_eq!(hub.reads(), 1);
        assert!(lease.get(WATCH_LEASE_NAME).unwrap().is_none());
    }

    #[tokio::test]
    async fn second_instance_exits_without_running() {
        let hub = FakeHub::with_state(Tier::S1, 5, 0);
        let lease = LeaseStore::open_in_memory().unwrap();
        assert!(lease.try_acquire(WATCH_LEASE_NAME, "other", 1200).unwrap());

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        watch_loop(&hub, lease.clone(), "b").run(shutdown_rx).await.unwrap();

        // Never touched the hub, never took the lease.
        assert_eq!(hub.reads(), 0);
        assert_eq!(lease.get(WATCH_LEASE_NAME).unwrap().unwrap().holder, "other");
    }

    #[tokio::test]
    async fn cycle_error_does_not_kill_the_loop() {
        let hub = FakeHub::with_state(Tier::S1, 5, 0);
        hub.fail_reads();
        let lease = LeaseStore::open_in_memory().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();

        // The failed cycle is logged, the loop shuts down cleanly.
        watch_loop(&hub, lease.clone(), "a").run(shutdown_rx).await.unwrap();
        assert_eq!(hub.reads(), 1);
    }

    #[tokio::test]
    async fn stops_when_the_lease_is_taken_over() {
        let hub = FakeHub::with_state(Tier::S1, 5, 0);
        let lease = LeaseStore::open_in_memory().unwrap();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let driver = ScaleDriver::new(
            hub.clone(),
            hub.clone(),
            Some(FakeNotifier::default()),
            "test-hub",
            1,
        );
        let watch_loop = WatchLoop::new(driver, lease.clone(), "a", Duration::from_millis(10));
        let handle = tokio::spawn(async move { watch_loop.run(shutdown_rx).await });

        // Wait for the first cycle so the loop is definitely past acquire.
        for _ in 0..200 {
            if hub.reads() >= 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(hub.reads() >= 1);

        // Take the lease over with a far-future clock, as if holder "a"
        // had stalled past the TTL.
        assert!(
            lease
                .try_acquire_at(WATCH_LEASE_NAME, "b", 1, u64::MAX / 2)
                .unwrap()
        );

        // The loop notices at its next renewal and stops on its own,
        // leaving the new holder in place.
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop keeps running after losing the lease")
            .unwrap()
            .unwrap();
        assert_eq!(lease.get(WATCH_LEASE_NAME).unwrap().unwrap().holder, "b");
    }
}
