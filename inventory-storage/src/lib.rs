//! Inventory Storage - Persistence Backend Trait and Implementations
//!
//! Defines the durable-store contract every inventory service sits on, plus
//! a JSON-file backend and an in-memory backend.

pub mod disk;
pub mod memory;

pub use disk::DiskInventorySource;
pub use memory::MemoryInventorySource;

use async_trait::async_trait;
use inventory_core::{InventoryResult, Product};
use std::sync::Arc;

// ============================================================================
// PERSISTENCE BACKEND TRAIT
// ============================================================================

/// Durable store of products.
///
/// Implementations own the system of record. Missing products are not an
/// error: `get` returns `None` and `update` returns `false`.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Read every product, in stored order.
    async fn get_all(&self) -> InventoryResult<Vec<Product>>;

    /// Get the first product whose id matches exactly.
    async fn get(&self, id: &str) -> InventoryResult<Option<Product>>;

    /// Persist a new product.
    async fn add(&self, product: &Product) -> InventoryResult<()>;

    /// Replace the stored product with the same id.
    ///
    /// Returns whether a matching product existed.
    async fn update(&self, product: &Product) -> InventoryResult<bool>;
}

#[async_trait]
impl<T: InventorySource + ?Sized> InventorySource for Arc<T> {
    async fn get_all(&self) -> InventoryResult<Vec<Product>> {
        (**self).get_all().await
    }

    async fn get(&self, id: &str) -> InventoryResult<Option<Product>> {
        (**self).get(id).await
    }

    async fn add(&self, product: &Product) -> InventoryResult<()> {
        (**self).add(product).await
    }

    async fn update(&self, product: &Product) -> InventoryResult<bool> {
        (**self).update(product).await
    }
}

/// Replace the first product sharing `product`'s id.
///
/// Returns false when nothing matched. Shared by the backends so update
/// semantics cannot drift between them.
pub(crate) fn replace_by_id(products: &mut [Product], product: &Product) -> bool {
    match products.iter_mut().find(|p| p.same_identity(product)) {
        Some(slot) => {
            *slot = product.clone();
            true
        }
        None => false,
    }
}
