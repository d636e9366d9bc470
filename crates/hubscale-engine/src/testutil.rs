//! In-memory fakes for the boundary traits.

use std::sync::{Arc, Mutex};

use hubscale_control::{ControlError, ControlResult, HubReader, HubState, HubWriter};
use hubscale_core::{Capacity, Tier};
use hubscale_notify::{Notifier, NotifyError};

#[derive(Debug)]
struct FakeHubInner {
    capacity: Capacity,
    total_messages: u64,
    reads: u32,
    applied: Vec<Capacity>,
    fail_reads: bool,
    fail_writes: bool,
    drop_usage_metric: bool,
}

impl Default for FakeHubInner {
    fn default() -> Self {
        Self {
            capacity: Capacity::new(Tier::S1, 1),
            total_messages: 0,
            reads: 0,
            applied: Vec::new(),
            fail_reads: false,
            fail_writes: false,
            drop_usage_metric: false,
        }
    }
}

/// Fake hub acting as both reader and writer.
#[derive(Debug, Clone, Default)]
pub struct FakeHub {
    inner: Arc<Mutex<FakeHubInner>>,
}

impl FakeHub {
    pub fn with_state(tier: Tier, units: u32, total_messages: u64) -> Self {
        let hub = Self::default();
        {
            let mut inner = hub.inner.lock().unwrap();
            inner.capacity = Capacity::new(tier, units);
            inner.total_messages = total_messages;
        }
        hub
    }

    pub fn fail_reads(&self) {
        self.inner.lock().unwrap().fail_reads = true;
    }

    pub fn fail_writes(&self) {
        self.inner.lock().unwrap().fail_writes = true;
    }

    pub fn drop_usage_metric(&self) {
        self.inner.lock().unwrap().drop_usage_metric = true;
    }

    pub fn applied(&self) -> Vec<Capacity> {
        self.inner.lock().unwrap().applied.clone()
    }

    pub fn reads(&self) -> u32 {
        self.inner.lock().unwrap().reads
    }
}

impl HubReader for FakeHub {
    async fn read(&self) -> ControlResult<HubState> {
        let mut inner = self.inner.lock().unwrap();
        inner.reads += 1;
        if inner.fail_reads {
            return Err(ControlError::Read("fake hub unreachable".to_string()));
        }
        if inner.drop_usage_metric {
            return Err(ControlError::UsageMetricMissing);
        }
        Ok(HubState {
            capacity: inner.capacity,
            total_messages: inner.total_messages,
        })
    }
}

impl HubWriter for FakeHub {
    async fn apply(&self, capacity: Capacity) -> ControlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(ControlError::Write("fake hub rejected update".to_string()));
        }
        inner.capacity = capacity;
        inner.applied.push(capacity);
        Ok(())
    }
}

/// Fake notifier capturing (subject, body) pairs.
#[derive(Debug, Clone, Default)]
pub struct FakeNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Request("fake mail outage".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}
