//! In-memory persistence backend.

use async_trait::async_trait;
use inventory_core::{InventoryResult, Product, StorageError};
use std::sync::{Arc, RwLock};

use crate::{replace_by_id, InventorySource};

/// In-memory product store, ordered by insertion.
///
/// Shares add/update semantics with the disk backend: duplicate ids are
/// appended and updates replace the first match.
#[derive(Debug, Default, Clone)]
pub struct MemoryInventorySource {
    products: Arc<RwLock<Vec<Product>>>,
}

impl MemoryInventorySource {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with products.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }

    /// Number of stored products.
    pub fn len(&self) -> InventoryResult<usize> {
        let products = self.products.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(products.len())
    }

    pub fn is_empty(&self) -> InventoryResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove all stored products.
    pub fn clear(&self) -> InventoryResult<()> {
        self.products
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }
}

#[async_trait]
impl InventorySource for MemoryInventorySource {
    async fn get_all(&self) -> InventoryResult<Vec<Product>> {
        let products = self.products.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(products.clone())
    }

    async fn get(&self, id: &str) -> InventoryResult<Option<Product>> {
        let products = self.products.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(products.iter().find(|p| p.id() == id).cloned())
    }

    async fn add(&self, product: &Product) -> InventoryResult<()> {
        let mut products = self
            .products
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        products.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> InventoryResult<bool> {
        let mut products = self
            .products
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(replace_by_id(&mut products, product))
    }
}
