//! Pass-through service over a persistence backend.

use async_trait::async_trait;
use inventory_core::{InventoryResult, Product};
use inventory_storage::InventorySource;

use crate::{filter_products, InventoryService, SearchPredicate};

/// Forwards every operation to an [`InventorySource`].
///
/// No caching and no retries; backend errors reach the caller unchanged.
#[derive(Debug, Clone)]
pub struct SourceInventoryService<S> {
    source: S,
}

impl<S: InventorySource> SourceInventoryService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Get a reference to the backing source.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[async_trait]
impl<S: InventorySource> InventoryService for SourceInventoryService<S> {
    async fn get_all_products(&self) -> InventoryResult<Vec<Product>> {
        self.source.get_all().await
    }

    async fn get_product(&self, id: &str) -> InventoryResult<Option<Product>> {
        self.source.get(id).await
    }

    async fn add_product(&self, product: &Product) -> InventoryResult<()> {
        tracing::debug!(product_id = product.id(), "Adding product");
        self.source.add(product).await
    }

    async fn update_product(&self, product: &Product) -> InventoryResult<bool> {
        let updated = self.source.update(product).await?;
        tracing::debug!(product_id = product.id(), updated, "Updated product");
        Ok(updated)
    }

    async fn search_products(
        &self,
        query: &str,
        predicate: SearchPredicate<'_>,
    ) -> InventoryResult<Vec<Product>> {
        let products = self.source.get_all().await?;
        Ok(filter_products(&products, query, predicate))
    }
}
