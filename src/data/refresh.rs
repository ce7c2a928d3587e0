//! Snapshot storage and refresh coordination for the permit entity list.
//!
//! Renderers must never observe a mix of old and new entities, so the store
//! holds exactly one immutable snapshot behind an atomically swapped `Arc`.
//! Refreshes are tagged with monotonic sequence numbers; a completion that
//! arrives after a newer one has installed is dropped, and overlapping
//! triggers are coalesced to keep at most one fetch in flight.

use crate::{
    data::Permit,
    traits::{Clock, PermitSource},
};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, RwLock,
};
use std::time::Duration;

/// One immutable generation of the entity list.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// Sequence number of the refresh that produced this snapshot.
    pub seq: u64,
    pub permits: Vec<Permit>,
}

impl EntitySnapshot {
    pub fn empty() -> Self {
        Self {
            seq: 0,
            permits: Vec::new(),
        }
    }
}

/// Holds the current entity snapshot and enforces last-writer-wins by
/// sequence number.
pub struct EntityStore {
    current: RwLock<Arc<EntitySnapshot>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(EntitySnapshot::empty())),
        }
    }

    /// The current snapshot. Cheap; clones an `Arc`.
    pub fn snapshot(&self) -> Arc<EntitySnapshot> {
        self.current
            .read()
            .expect("entity store lock poisoned")
            .clone()
    }

    /// Installs a refreshed entity list. Returns `false` (and drops the
    /// data) when a newer refresh has already installed — out-of-order
    /// completions must not regress the displayed state.
    pub fn install(&self, seq: u64, permits: Vec<Permit>) -> bool {
        let mut current = self.current.write().expect("entity store lock poisoned");
        if seq <= current.seq {
            log::debug!(
                "dropping stale refresh {} (current is {})",
                seq,
                current.seq
            );
            return false;
        }
        *current = Arc::new(EntitySnapshot { seq, permits });
        true
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Ticket for one in-flight refresh. Completing or abandoning it releases
/// the in-flight slot.
#[derive(Debug)]
pub struct RefreshTicket {
    seq: u64,
}

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Issues sequence numbers and keeps at most one refresh in flight.
pub struct RefreshCoordinator {
    next_seq: AtomicU64,
    in_flight: AtomicBool,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            next_seq: AtomicU64::new(1),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Claims the in-flight slot. Returns `None` when a refresh is already
    /// running; overlapping triggers are skipped rather than queued.
    pub fn begin(&self) -> Option<RefreshTicket> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("refresh already in flight; skipping trigger");
            return None;
        }
        Some(RefreshTicket {
            seq: self.next_seq.fetch_add(1, Ordering::AcqRel),
        })
    }

    /// Installs a completed refresh and releases the slot.
    pub fn complete(&self, ticket: RefreshTicket, store: &EntityStore, permits: Vec<Permit>) -> bool {
        let installed = store.install(ticket.seq, permits);
        self.in_flight.store(false, Ordering::Release);
        installed
    }

    /// Releases the slot without installing anything (fetch failed).
    pub fn abandon(&self, ticket: RefreshTicket) {
        log::debug!("abandoning refresh {}", ticket.seq);
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// A cached value with its fetch time, expiring against an injected clock.
#[derive(Debug, Clone)]
pub struct DatasetCache<T> {
    value: T,
    fetched_at: instant::Instant,
}

impl<T> DatasetCache<T> {
    pub fn new(value: T, clock: &dyn Clock) -> Self {
        Self {
            value,
            fetched_at: clock.now(),
        }
    }

    /// The cached value, or `None` once it is older than `ttl`.
    pub fn get(&self, clock: &dyn Clock, ttl: Duration) -> Option<&T> {
        if clock.now().duration_since(self.fetched_at) < ttl {
            Some(&self.value)
        } else {
            None
        }
    }

    /// Replaces the value and resets the fetch time.
    pub fn replace(&mut self, value: T, clock: &dyn Clock) {
        self.value = value;
        self.fetched_at = clock.now();
    }
}

/// Recurring refresh task: triggers a fetch on a fixed cadence, coalescing
/// overlaps through the coordinator. The task is aborted when the scheduler
/// is dropped.
#[cfg(feature = "tokio-runtime")]
pub struct RefreshScheduler {
    handle: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "tokio-runtime")]
impl RefreshScheduler {
    pub fn spawn(
        interval: Duration,
        source: Arc<dyn PermitSource>,
        store: Arc<EntityStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(ticket) = coordinator.begin() else {
                    continue;
                };
                match source.fetch().await {
                    Ok(permits) => {
                        let seq = ticket.seq();
                        if coordinator.complete(ticket, &store, permits) {
                            log::debug!("installed refresh {}", seq);
                        }
                    }
                    Err(error) => {
                        log::warn!("permit refresh failed: {}", error);
                        coordinator.abandon(ticket);
                    }
                }
            }
        });
        Self { handle }
    }
}

#[cfg(feature = "tokio-runtime")]
impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::LatLng, data::PermitCategory};
    use std::sync::Mutex;

    fn permit(id: &str) -> Permit {
        Permit {
            id: id.to_string(),
            position: LatLng::new(40.7484, -73.9857),
            category: PermitCategory::Other,
            issued_date: None,
            address: None,
        }
    }

    struct ManualClock {
        now: Mutex<instant::Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(instant::Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> instant::Instant {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn test_snapshot_replaced_atomically() {
        let store = EntityStore::new();
        assert!(store.snapshot().permits.is_empty());

        assert!(store.install(1, vec![permit("a"), permit("b")]));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.seq, 1);
        assert_eq!(snapshot.permits.len(), 2);
    }

    #[test]
    fn test_out_of_order_completion_dropped() {
        let store = EntityStore::new();
        assert!(store.install(2, vec![permit("new")]));
        assert!(!store.install(1, vec![permit("stale")]));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.seq, 2);
        assert_eq!(snapshot.permits[0].id, "new");
    }

    #[test]
    fn test_at_most_one_in_flight() {
        let coordinator = RefreshCoordinator::new();
        let first = coordinator.begin().unwrap();
        assert!(coordinator.begin().is_none());

        coordinator.abandon(first);
        assert!(!coordinator.is_in_flight());

        let second = coordinator.begin().unwrap();
        assert!(second.seq() > 1);
    }

    #[test]
    fn test_complete_installs_and_releases() {
        let store = EntityStore::new();
        let coordinator = RefreshCoordinator::new();

        let ticket = coordinator.begin().unwrap();
        assert!(coordinator.complete(ticket, &store, vec![permit("a")]));
        assert!(!coordinator.is_in_flight());
        assert_eq!(store.snapshot().permits.len(), 1);
    }

    #[test]
    fn test_cache_expiry_with_manual_clock() {
        let clock = ManualClock::new();
        let ttl = Duration::from_secs(600);
        let cache = DatasetCache::new("2026-08-01".to_string(), &clock);

        assert_eq!(cache.get(&clock, ttl).map(String::as_str), Some("2026-08-01"));
        clock.advance(Duration::from_secs(599));
        assert!(cache.get(&clock, ttl).is_some());
        clock.advance(Duration::from_secs(2));
        assert!(cache.get(&clock, ttl).is_none());
    }

    #[cfg(feature = "tokio-runtime")]
    mod scheduler {
        use super::*;
        use crate::Result;

        struct StaticSource;

        #[async_trait::async_trait]
        impl PermitSource for StaticSource {
            async fn fetch(&self) -> Result<Vec<Permit>> {
                Ok(vec![permit("scheduled")])
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_scheduler_installs_snapshots() {
            let store = Arc::new(EntityStore::new());
            let coordinator = Arc::new(RefreshCoordinator::new());
            let scheduler = RefreshScheduler::spawn(
                Duration::from_secs(300),
                Arc::new(StaticSource),
                store.clone(),
                coordinator.clone(),
            );

            tokio::time::sleep(Duration::from_secs(301)).await;
            tokio::task::yield_now().await;

            assert!(store.snapshot().seq >= 1);
            drop(scheduler);
        }
    }
}
