//! Error types for inventory operations

use thiserror::Error;

/// Persistence layer errors.
///
/// "Not found" is deliberately absent: lookups return `Option` and updates
/// return `false` when no product matches.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("I/O failure on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to decode product data: {reason}")]
    Deserialize { reason: String },

    #[error("Failed to encode product data: {reason}")]
    Serialize { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    /// Build an I/O error for the given path.
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all inventory errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

// =============================================================================
// TESTS
// =============================================================================
