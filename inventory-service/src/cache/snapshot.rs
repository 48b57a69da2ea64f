//! Snapshot state and read metadata.

use chrono::Utc;
use inventory_core::{Product, Timestamp};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Why a snapshot was (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// Eager load at construction.
    Initial,
    /// A read found the snapshot older than the TTL.
    Expired,
    /// A write to the wrapped service succeeded.
    Write,
    /// The snapshot was explicitly invalidated.
    Invalidated,
    /// Caller asked for a refresh.
    Manual,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::Expired => "expired",
            Self::Write => "write",
            Self::Invalidated => "invalidated",
            Self::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// The cached catalog plus when it was fetched.
///
/// Replaced wholesale on refresh; never edited in place.
#[derive(Debug)]
pub(crate) struct SnapshotState {
    products: Arc<Vec<Product>>,
    /// Monotonic refresh time, used for expiry.
    refreshed_at: Instant,
    /// Wall-clock refresh time, reported to callers.
    refreshed_at_utc: Timestamp,
    /// Set by `invalidate` or a failed refresh; forces the next read to refresh.
    invalidated: bool,
}

impl SnapshotState {
    /// An empty, already-expired snapshot.
    pub(crate) fn empty() -> Self {
        Self {
            products: Arc::new(Vec::new()),
            refreshed_at: Instant::now(),
            refreshed_at_utc: Utc::now(),
            invalidated: true,
        }
    }

    /// `now - refreshed_at > ttl`, or explicitly invalidated.
    pub(crate) fn is_expired(&self, ttl: Duration) -> bool {
        self.invalidated || self.refreshed_at.elapsed() > ttl
    }

    pub(crate) fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub(crate) fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub(crate) fn replace(&mut self, products: Vec<Product>) {
        self.products = Arc::new(products);
        self.refreshed_at = Instant::now();
        self.refreshed_at_utc = Utc::now();
        self.invalidated = false;
    }

    pub(crate) fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.products)
    }

    pub(crate) fn refreshed_at_utc(&self) -> Timestamp {
        self.refreshed_at_utc
    }

    pub(crate) fn age(&self) -> Duration {
        self.refreshed_at.elapsed()
    }
}

/// Result of a cache read, carrying snapshot metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    refreshed_at: Timestamp,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    pub(crate) fn new(value: T, refreshed_at: Timestamp, was_cache_hit: bool) -> Self {
        Self {
            value,
            refreshed_at,
            was_cache_hit,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the snapshot behind this read was fetched.
    pub fn refreshed_at(&self) -> Timestamp {
        self.refreshed_at
    }

    /// True when the read was served without contacting the wrapped service.
    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Map the inner value, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            refreshed_at: self.refreshed_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}
