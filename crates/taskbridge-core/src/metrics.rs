//! Global atomic counters for taskbridge.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (server shutdown, end of a replay).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations, no locking.
pub struct Metrics {
    events_received: AtomicU64,
    references_processed: AtomicU64,
    reference_failures: AtomicU64,
    comments_posted: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            events_received: AtomicU64::new(0),
            references_processed: AtomicU64::new(0),
            reference_failures: AtomicU64::new(0),
            comments_posted: AtomicU64::new(0),
        }
    }

    /// Increment the events-received counter by one.
    pub fn inc_events_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "events_received", "counter incremented");
    }

    /// Increment the references-processed counter by one.
    pub fn inc_references_processed(&self) {
        self.references_processed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "references_processed", "counter incremented");
    }

    /// Increment the reference-failures counter by one.
    pub fn inc_reference_failures(&self) {
        self.reference_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "reference_failures", "counter incremented");
    }

    /// Increment the comments-posted counter by one.
    pub fn inc_comments_posted(&self) {
        self.comments_posted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "comments_posted", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            events_received = self.events_received(),
            references_processed = self.references_processed(),
            reference_failures = self.reference_failures(),
            comments_posted = self.comments_posted(),
        );
    }

    pub fn events_received(&self) -> u64 {
        self.events_received.load(Ordering::Relaxed)
    }

    pub fn references_processed(&self) -> u64 {
        self.references_processed.load(Ordering::Relaxed)
    }

    pub fn reference_failures(&self) -> u64 {
        self.reference_failures.load(Ordering::Relaxed)
    }

    pub fn comments_posted(&self) -> u64 {
        self.comments_posted.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.events_received.store(0, Ordering::Relaxed);
        self.references_processed.store(0, Ordering::Relaxed);
        self.reference_failures.store(0, Ordering::Relaxed);
        self.comments_posted.store(0, Ordering::Relaxed);
    }
}
