use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::time::Instant;

/// Statistics regarding the pool
#[derive(Debug, Default)]
#[must_use]
pub struct PoolMetrics {
    /// The total time resources were held by callers in microseconds.
    total_active: AtomicU64,
    /// The total time callers spent in acquisition in microseconds.
    total_waiting: AtomicU64,
    /// The number of times acquiring a resource failed
    failure_count: AtomicUsize,
    /// The number of resources created by the factory
    created: AtomicUsize,
    /// The number of resources closed by the pool
    closed: AtomicUsize,
    /// The number of stale resources evicted during acquisition
    expired: AtomicUsize,
}

// 64bit microseconds is 580000 years - really not important
#[allow(clippy::cast_possible_truncation)]
impl PoolMetrics {
    pub(crate) fn record_waiting(&self, start: Instant) {
        let waiting = start.elapsed().as_micros() as u64;
        let _ = self.total_waiting.fetch_add(waiting, Ordering::Relaxed);
    }

    pub(crate) fn record_active(&self, start: Instant) {
        let active = start.elapsed().as_micros() as u64;
        let _ = self.total_active.fetch_add(active, Ordering::Relaxed);
    }
}

impl PoolMetrics {
    pub(crate) fn record_failure(&self) {
        let _ = self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_created(&self) {
        let _ = self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_closed(&self) {
        let _ = self.closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expired(&self) {
        let _ = self.expired.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of microseconds that resources were held by
    /// [`Object`] guards
    ///
    /// [`Object`]: super::Object
    pub fn microseconds_active(&self) -> u64 {
        self.total_active.load(Ordering::Relaxed)
    }
    /// Get the total number of microseconds that tasks were waiting for a resource
    pub fn microseconds_waiting(&self) -> u64 {
        self.total_waiting.load(Ordering::Relaxed)
    }
    /// Get the total number of failures to retrieve a resource from the pool
    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::Relaxed)
    }
    /// Get the total number of resources created by the factory
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
    /// Get the total number of resources closed, including stale ones
    pub fn closed_count(&self) -> usize {
        self.closed.load(Ordering::Relaxed)
    }
    /// Get the total number of stale resources evicted on acquisition
    pub fn expired_count(&self) -> usize {
        self.expired.load(Ordering::Relaxed)
    }
}
