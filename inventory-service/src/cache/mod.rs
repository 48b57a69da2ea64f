//! Snapshot cache in front of an inventory service.
//!
//! The cache holds exactly one value: a verbatim copy of the last successful
//! full catalog read. Reads are served from it until it is older than the
//! configured TTL; writes go to the wrapped service first and then force a
//! full re-fetch. There is no partial patching of the snapshot and no
//! background timer - refresh only ever happens on the calling task.
//!
//! # Consistency
//!
//! - A read never observes a half-replaced snapshot.
//! - After expiry, a burst of readers triggers one refresh, not one each.
//! - A failed refresh leaves the previous snapshot in place and the cache
//!   expired, so the next read tries again.
//! - A failed write skips the refresh and leaves the snapshot untouched.

pub mod cached;
pub mod snapshot;
pub mod stats;

pub use cached::CachedInventoryService;
pub use snapshot::{CacheRead, RefreshReason};
pub use stats::CacheStats;
