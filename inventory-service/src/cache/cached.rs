//! Caching decorator over any [`InventoryService`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inventory_core::{CacheConfig, InventoryResult, Product, Timestamp};
use tokio::sync::Mutex;

use super::snapshot::{CacheRead, RefreshReason, SnapshotState};
use super::stats::{CacheStats, StatsRecorder};
use crate::{filter_products, InventoryService, SearchPredicate};

/// Inventory service that serves reads from an in-memory catalog snapshot.
///
/// Reads check the snapshot age first and refresh it from the wrapped
/// service once it is older than the TTL. Writes are forwarded to the
/// wrapped service unconditionally and, on success, followed by a forced
/// refresh.
///
/// The snapshot and its timestamp sit behind a single async mutex held
/// across expiry check + refresh + read, and across write + refresh, so
/// concurrent callers never see a partial swap and never refresh twice for
/// the same expiry.
///
/// # Example
///
/// ```ignore
/// let cache = CachedInventoryService::with_config(
///     SourceInventoryService::new(MemoryInventorySource::new()),
///     CacheConfig::new().with_ttl(Duration::from_secs(30)),
/// )
/// .await?;
///
/// cache.add_product(&product).await?; // write, then full refresh
/// let all = cache.get_all_products().await?; // served from the snapshot
/// ```
#[derive(Debug)]
pub struct CachedInventoryService<S> {
    inner: S,
    config: CacheConfig,
    state: Mutex<SnapshotState>,
    stats: StatsRecorder,
}

impl<S: InventoryService> CachedInventoryService<S> {
    /// Wrap `inner` with the default 5 minute TTL and load the first snapshot.
    pub async fn new(inner: S) -> InventoryResult<Self> {
        Self::with_config(inner, CacheConfig::default()).await
    }

    /// Wrap `inner` with the given configuration and load the first snapshot.
    ///
    /// Fails if the configuration is invalid or the initial load fails.
    pub async fn with_config(inner: S, config: CacheConfig) -> InventoryResult<Self> {
        config.validate()?;
        let cache = Self {
            inner,
            config,
            state: Mutex::new(SnapshotState::empty()),
            stats: StatsRecorder::default(),
        };
        {
            let mut state = cache.state.lock().await;
            cache.refresh_locked(&mut state, RefreshReason::Initial).await?;
        }
        Ok(cache)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Get a reference to the wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Wall-clock time of the last successful refresh.
    pub async fn last_refreshed_at(&self) -> Timestamp {
        self.state.lock().await.refreshed_at_utc()
    }

    /// Time elapsed since the last successful refresh.
    pub async fn snapshot_age(&self) -> Duration {
        self.state.lock().await.age()
    }

    /// Mark the snapshot expired. The next read refreshes it.
    ///
    /// The current snapshot is kept and no I/O happens here.
    pub async fn invalidate(&self) {
        self.state.lock().await.invalidate();
        tracing::debug!("Snapshot invalidated");
    }

    /// Refresh the snapshot now, regardless of its age.
    pub async fn refresh(&self) -> InventoryResult<()> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state, RefreshReason::Manual).await
    }

    /// Read the catalog snapshot along with how it was obtained.
    pub async fn read_snapshot(&self) -> InventoryResult<CacheRead<Arc<Vec<Product>>>> {
        let mut state = self.state.lock().await;
        if state.is_expired(self.config.ttl) {
            self.stats.record_miss();
            let reason = if state.is_invalidated() {
                RefreshReason::Invalidated
            } else {
                RefreshReason::Expired
            };
            tracing::debug!(%reason, "Snapshot expired");
            self.refresh_locked(&mut state, reason).await?;
            return Ok(CacheRead::new(
                state.products(),
                state.refreshed_at_utc(),
                false,
            ));
        }
        self.stats.record_hit();
        Ok(CacheRead::new(state.products(), state.refreshed_at_utc(), true))
    }

    async fn snapshot(&self) -> InventoryResult<Arc<Vec<Product>>> {
        Ok(self.read_snapshot().await?.into_value())
    }

    /// Re-fetch the full catalog and swap it in. Caller holds the lock.
    ///
    /// On failure the previous snapshot stays, marked expired.
    async fn refresh_locked(
        &self,
        state: &mut SnapshotState,
        reason: RefreshReason,
    ) -> InventoryResult<()> {
        match self.inner.get_all_products().await {
            Ok(products) => {
                let count = products.len();
                state.replace(products);
                self.stats.record_refresh();
                tracing::info!(products = count, %reason, "Snapshot refreshed");
                Ok(())
            }
            Err(e) => {
                state.invalidate();
                self.stats.record_refresh_failure();
                tracing::warn!(error = %e, %reason, "Snapshot refresh failed, keeping previous snapshot");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: InventoryService> InventoryService for CachedInventoryService<S> {
    async fn get_all_products(&self) -> InventoryResult<Vec<Product>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.as_ref().clone())
    }

    async fn get_product(&self, id: &str) -> InventoryResult<Option<Product>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.iter().find(|p| p.id() == id).cloned())
    }

    async fn add_product(&self, product: &Product) -> InventoryResult<()> {
        let mut state = self.state.lock().await;
        if let Err(e) = self.inner.add_product(product).await {
            tracing::warn!(error = %e, product_id = product.id(), "Add failed, snapshot left as is");
            return Err(e);
        }
        self.refresh_locked(&mut state, RefreshReason::Write).await
    }

    async fn update_product(&self, product: &Product) -> InventoryResult<bool> {
        let mut state = self.state.lock().await;
        let updated = match self.inner.update_product(product).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(error = %e, product_id = product.id(), "Update failed, snapshot left as is");
                return Err(e);
            }
        };
        if updated {
            self.refresh_locked(&mut state, RefreshReason::Write).await?;
        }
        Ok(updated)
    }

    async fn search_products(
        &self,
        query: &str,
        predicate: SearchPredicate<'_>,
    ) -> InventoryResult<Vec<Product>> {
        let snapshot = self.snapshot().await?;
        Ok(filter_products(snapshot.iter(), query, predicate))
    }
}
