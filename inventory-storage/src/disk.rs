//! JSON file persistence backend.
//!
//! The catalog file is a JSON array of product objects. Property names are
//! matched case-insensitively on read (`"Id"`, `"ID"` and `"id"` are the
//! same field) and the file is rewritten pretty-printed on every mutation.

use async_trait::async_trait;
use inventory_core::{InventoryResult, Product, StorageError};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::{replace_by_id, InventorySource};

/// Product store backed by a single JSON file.
#[derive(Debug)]
pub struct DiskInventorySource {
    path: PathBuf,
    /// Serializes read-modify-write cycles so concurrent mutations cannot
    /// drop each other's changes.
    write_lock: Mutex<()>,
}

impl DiskInventorySource {
    /// Create a source for the given file. The file is not touched until the
    /// first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_products(&self) -> InventoryResult<Vec<Product>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::io(self.display_path(), &e))?;
        let products = parse_catalog(&raw)?;
        tracing::debug!(path = %self.path.display(), count = products.len(), "Read catalog file");
        Ok(products)
    }

    async fn write_products(&self, products: &[Product]) -> InventoryResult<()> {
        let json = serde_json::to_string_pretty(products).map_err(|e| StorageError::Serialize {
            reason: e.to_string(),
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| StorageError::io(self.display_path(), &e))?;
        tracing::debug!(path = %self.path.display(), count = products.len(), "Wrote catalog file");
        Ok(())
    }
}

#[async_trait]
impl InventorySource for DiskInventorySource {
    async fn get_all(&self) -> InventoryResult<Vec<Product>> {
        self.read_products().await
    }

    async fn get(&self, id: &str) -> InventoryResult<Option<Product>> {
        let products = self.read_products().await?;
        Ok(products.into_iter().find(|p| p.id() == id))
    }

    async fn add(&self, product: &Product) -> InventoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.read_products().await?;
        products.push(product.clone());
        self.write_products(&products).await
    }

    async fn update(&self, product: &Product) -> InventoryResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.read_products().await?;
        if !replace_by_id(&mut products, product) {
            return Ok(false);
        }
        self.write_products(&products).await?;
        Ok(true)
    }
}

/// Decode catalog text into products.
///
/// Blank text and a `null` document both mean an empty catalog.
fn parse_catalog(raw: &str) -> Result<Vec<Product>, StorageError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| StorageError::Deserialize {
        reason: e.to_string(),
    })?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(lowercase_keys(value)).map_err(|e| StorageError::Deserialize {
        reason: e.to_string(),
    })
}

/// Lower-case every object key, recursively.
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}
