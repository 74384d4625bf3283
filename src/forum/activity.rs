//! Session activity tracking.
//!
//! Keeps the last time each authenticated identity was seen and evicts the
//! ones that stayed quiet for longer than the TTL. Access control does not
//! depend on this map; it only answers "who is around right now".

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::clock::{duration_millis, Clock, Timestamp};

/// How long an identity stays live without activity. Also the sweep period.
pub const SESSION_TTL: Duration = Duration::from_secs(3 * 60);

/// Process-scoped record of `identity -> last seen`.
pub struct ActivityTracker {
    records: Mutex<HashMap<String, Timestamp>>,
    clock: Arc<dyn Clock>,
}

impl ActivityTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Mark `identity` as seen now, creating or overwriting its record.
    pub fn record(&self, identity: &str) {
        let now = self.clock.now();
        self.lock().insert(identity.to_string(), now);
    }

    /// Forget `identity`. Absent identities are ignored.
    pub fn remove(&self, identity: &str) {
        self.lock().remove(identity);
    }

    /// Evict every record with `now - last_seen > ttl` and return how many
    /// were dropped.
    ///
    /// The lock is held for this single pass only, so concurrent `record`
    /// and `remove` calls wait at most one sweep.
    pub fn sweep(&self, now: Timestamp, ttl: Duration) -> usize {
        let ttl = duration_millis(ttl);
        let mut records = self.lock();
        let before = records.len();
        records.retain(|_, last_seen| now.saturating_sub(*last_seen) <= ttl);
        before - records.len()
    }

    pub fn last_seen(&self, identity: &str) -> Option<Timestamp> {
        self.lock().get(identity).copied()
    }

    /// Snapshot of all records, most recently seen first.
    pub fn snapshot(&self) -> Vec<(String, Timestamp)> {
        let mut records: Vec<(String, Timestamp)> = self
            .lock()
            .iter()
            .map(|(identity, last_seen)| (identity.clone(), *last_seen))
            .collect();
        records.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        records
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Timestamp>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run `sweep` every `ttl` until the runtime shuts down.
pub fn spawn_sweeper(tracker: Arc<ActivityTracker>, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl);
        // The first tick completes immediately; nothing can be stale yet.
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = tracker.sweep(tracker.now(), ttl);
            if evicted > 0 {
                tracing::debug!(
                    "Activity sweep evicted {} identities, {} still live",
                    evicted,
                    tracker.len()
                );
            }
        }
    })
}
