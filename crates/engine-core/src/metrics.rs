use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_read: AtomicU64,
    rows_written: AtomicU64,
    flushes: AtomicU64,
    rate_limited: AtomicU64,
    failures: AtomicU64,
}

/// Shared connector counters. Clones observe the same values.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub rows_written: u64,
    pub flushes: u64,
    pub rate_limited: u64,
    pub failures: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_records_read(&self, count: u64) {
        self.inner.records_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_rows_written(&self, count: u64) {
        self.inner.rows_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_flushes(&self) {
        self.inner.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rate_limited(&self) {
        self.inner.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_read: self.inner.records_read.load(Ordering::Relaxed),
            rows_written: self.inner.rows_written.load(Ordering::Relaxed),
            flushes: self.inner.flushes.load(Ordering::Relaxed),
            rate_limited: self.inner.rate_limited.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
