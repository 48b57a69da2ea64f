//! Inventory Service - catalog operations and the snapshot cache
//!
//! [`InventoryService`] is the contract callers program against.
//! [`SourceInventoryService`] forwards it to a persistence backend, and
//! [`CachedInventoryService`] decorates any implementation with a
//! time-based snapshot of the full catalog.
//!
//! # Example
//!
//! ```ignore
//! let source = DiskInventorySource::new("products.json");
//! let service = CachedInventoryService::new(SourceInventoryService::new(source)).await?;
//!
//! let jeans = service.get_product("100").await?;
//! let shoes = service.search_products("Shoes", &search::category_equals).await?;
//! ```

pub mod cache;
pub mod search;
pub mod service;

pub use cache::{CacheRead, CacheStats, CachedInventoryService, RefreshReason};
pub use service::SourceInventoryService;

use async_trait::async_trait;
use inventory_core::{InventoryResult, Product};
use std::sync::Arc;

/// Caller-supplied search filter: `(query, product) -> matches`.
pub type SearchPredicate<'a> = &'a (dyn Fn(&str, &Product) -> bool + Send + Sync);

/// Catalog operations.
///
/// Decorators implement the same trait as the services they wrap, so a
/// cache can stand in anywhere a plain service is expected.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Every product, in backend order.
    async fn get_all_products(&self) -> InventoryResult<Vec<Product>>;

    /// The product with exactly this id, or `None`.
    async fn get_product(&self, id: &str) -> InventoryResult<Option<Product>>;

    /// Persist a new product.
    async fn add_product(&self, product: &Product) -> InventoryResult<()>;

    /// Replace an existing product. Returns false if no product has its id.
    async fn update_product(&self, product: &Product) -> InventoryResult<bool>;

    /// Products for which `predicate(query, product)` holds, in order.
    async fn search_products(
        &self,
        query: &str,
        predicate: SearchPredicate<'_>,
    ) -> InventoryResult<Vec<Product>>;
}

#[async_trait]
impl<T: InventoryService + ?Sized> InventoryService for Arc<T> {
    async fn get_all_products(&self) -> InventoryResult<Vec<Product>> {
        (**self).get_all_products().await
    }

    async fn get_product(&self, id: &str) -> InventoryResult<Option<Product>> {
        (**self).get_product(id).await
    }

    async fn add_product(&self, product: &Product) -> InventoryResult<()> {
        (**self).add_product(product).await
    }

    async fn update_product(&self, product: &Product) -> InventoryResult<bool> {
        (**self).update_product(product).await
    }

    async fn search_products(
        &self,
        query: &str,
        predicate: SearchPredicate<'_>,
    ) -> InventoryResult<Vec<Product>> {
        (**self).search_products(query, predicate).await
    }
}

/// Apply a search predicate to a product list, preserving order.
pub(crate) fn filter_products<'p, I>(
    products: I,
    query: &str,
    predicate: SearchPredicate<'_>,
) -> Vec<Product>
where
    I: IntoIterator<Item = &'p Product>,
{
    products
        .into_iter()
        .filter(|p| predicate(query, p))
        .cloned()
        .collect()
}
