//! Inventory Core - Entity Types
//!
//! Pure data structures with no I/O. All other crates depend on this.
//! This crate contains the product model, the error taxonomy and the
//! cache configuration - no storage or caching logic.

use chrono::{DateTime, Utc};

pub mod config;
pub mod error;
pub mod product;

pub use config::{CacheConfig, DEFAULT_CACHE_TTL};
pub use error::{ConfigError, InventoryError, InventoryResult, StorageError};
pub use product::{Product, ProductId, Size};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
