//! Inventory Test Utilities
//!
//! Shared test infrastructure for the inventory workspace:
//! - Instrumented fakes that count calls and inject failures
//! - Proptest generators for products and catalogs
//! - Fixtures for common catalogs and on-disk catalog files
//! - Custom assertions for inventory results

pub use inventory_core::{
    CacheConfig, InventoryError, InventoryResult, Product, Size, StorageError,
};
pub use inventory_service::{InventoryService, SearchPredicate};
pub use inventory_storage::{InventorySource, MemoryInventorySource};

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Once;

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `debug` for the inventory crates.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "inventory_service=debug,inventory_storage=debug",
            )
        });
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// INSTRUMENTED FAKES
// ============================================================================

fn injected_failure(operation: &str) -> InventoryError {
    StorageError::Io {
        path: format!("injected://{}", operation),
        reason: "injected failure".to_string(),
    }
    .into()
}

/// Per-operation call counts.
#[derive(Debug, Default)]
pub struct CallCounts {
    get_all: AtomicUsize,
    get: AtomicUsize,
    add: AtomicUsize,
    update: AtomicUsize,
    search: AtomicUsize,
}

impl CallCounts {
    pub fn get_all(&self) -> usize {
        self.get_all.load(Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.get.load(Ordering::SeqCst)
    }

    pub fn add(&self) -> usize {
        self.add.load(Ordering::SeqCst)
    }

    pub fn update(&self) -> usize {
        self.update.load(Ordering::SeqCst)
    }

    pub fn search(&self) -> usize {
        self.search.load(Ordering::SeqCst)
    }
}

/// Failure switches shared by the fakes.
#[derive(Debug, Default)]
pub struct FailureSwitches {
    reads: AtomicBool,
    writes: AtomicBool,
}

impl FailureSwitches {
    pub fn fail_reads(&self, fail: bool) {
        self.reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self, operation: &str) -> InventoryResult<()> {
        if self.reads.load(Ordering::SeqCst) {
            return Err(injected_failure(operation));
        }
        Ok(())
    }

    fn check_write(&self, operation: &str) -> InventoryResult<()> {
        if self.writes.load(Ordering::SeqCst) {
            return Err(injected_failure(operation));
        }
        Ok(())
    }
}

/// Inventory service wrapper that counts calls and can be told to fail.
///
/// Counts are recorded before the failure check, so a failed call still
/// shows up.
#[derive(Debug, Default)]
pub struct CountingInventoryService<S> {
    inner: S,
    counts: CallCounts,
    failures: FailureSwitches,
}

impl<S: InventoryService> CountingInventoryService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: CallCounts::default(),
            failures: FailureSwitches::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn counts(&self) -> &CallCounts {
        &self.counts
    }

    pub fn failures(&self) -> &FailureSwitches {
        &self.failures
    }
}

#[async_trait]
impl<S: InventoryService> InventoryService for CountingInventoryService<S> {
    async fn get_all_products(&self) -> InventoryResult<Vec<Product>> {
        self.counts.get_all.fetch_add(1, Ordering::SeqCst);
        self.failures.check_read("get_all_products")?;
        self.inner.get_all_products().await
    }

    async fn get_product(&self, id: &str) -> InventoryResult<Option<Product>> {
        self.counts.get.fetch_add(1, Ordering::SeqCst);
        self.failures.check_read("get_product")?;
        self.inner.get_product(id).await
    }

    async fn add_product(&self, product: &Product) -> InventoryResult<()> {
        self.counts.add.fetch_add(1, Ordering::SeqCst);
        self.failures.check_write("add_product")?;
        self.inner.add_product(product).await
    }

    async fn update_product(&self, product: &Product) -> InventoryResult<bool> {
        self.counts.update.fetch_add(1, Ordering::SeqCst);
        self.failures.check_write("update_product")?;
        self.inner.update_product(product).await
    }

    async fn search_products(
        &self,
        query: &str,
        predicate: SearchPredicate<'_>,
    ) -> InventoryResult<Vec<Product>> {
        self.counts.search.fetch_add(1, Ordering::SeqCst);
        self.failures.check_read("search_products")?;
        self.inner.search_products(query, predicate).await
    }
}

/// Persistence backend wrapper that can be told to fail.
#[derive(Debug, Default)]
pub struct FailingInventorySource<S> {
    inner: S,
    failures: FailureSwitches,
}

impl<S: InventorySource> FailingInventorySource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failures: FailureSwitches::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn failures(&self) -> &FailureSwitches {
        &self.failures
    }
}

#[async_trait]
impl<S: InventorySource> InventorySource for FailingInventorySource<S> {
    async fn get_all(&self) -> InventoryResult<Vec<Product>> {
        self.failures.check_read("get_all")?;
        self.inner.get_all().await
    }

    async fn get(&self, id: &str) -> InventoryResult<Option<Product>> {
        self.failures.check_read("get")?;
        self.inner.get(id).await
    }

    async fn add(&self, product: &Product) -> InventoryResult<()> {
        self.failures.check_write("add")?;
        self.inner.add(product).await
    }

    async fn update(&self, product: &Product) -> InventoryResult<bool> {
        self.failures.check_write("update")?;
        self.inner.update(product).await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for products and catalogs.

    use super::*;
    use proptest::prelude::*;

    /// Generate a product id.
    pub fn arb_product_id() -> impl Strategy<Value = String> {
        "[0-9]{1,5}"
    }

    /// Generate any of the persisted size shapes.
    pub fn arb_size() -> impl Strategy<Value = Size> {
        prop_oneof![
            (1i64..200, 1i64..200).prop_map(|(h, w)| Size::dimensions(h, w)),
            (1i64..100).prop_map(Size::from),
            (1u32..120).prop_map(|halves| Size::from(f64::from(halves) / 2.0)),
            "(XS|S|M|L|XL|[0-9]{2})".prop_map(Size::Label),
            Just(Size::Unspecified),
        ]
    }

    /// Generate a product.
    pub fn arb_product() -> impl Strategy<Value = Product> {
        (
            arb_product_id(),
            arb_size(),
            "[A-Za-z ]{1,20}",
            "(Red|Blue|White|Black|Washed)",
            "(Pants|Shoes|Shirts|Hats)",
        )
            .prop_map(|(id, size, name, color, category)| {
                Product::new(id, size, name, color, category)
            })
    }

    /// Generate a catalog of products with distinct ids.
    pub fn arb_catalog(max_len: usize) -> impl Strategy<Value = Vec<Product>> {
        prop::collection::vec(arb_product(), 0..=max_len).prop_map(|products| {
            let mut seen = std::collections::HashSet::new();
            products
                .into_iter()
                .filter(|p| seen.insert(p.id().to_string()))
                .collect()
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built catalogs and catalog files.

    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Catalog file contents with one dimensioned and one scalar size.
    pub const SAMPLE_CATALOG_JSON: &str = r#"[{"id":"100","size":{"h":30,"w":28},"name":"Slim fit jeans","color":"Washed","category":"Pants"},{"id":"200","size":37,"name":"Summer heels","color":"White","category":"Shoes"}]"#;

    pub fn slim_fit_jeans() -> Product {
        Product::new("100", Size::dimensions(30, 28), "Slim fit jeans", "Washed", "Pants")
    }

    pub fn summer_heels() -> Product {
        Product::new("200", 37, "Summer heels", "White", "Shoes")
    }

    /// The products described by [`SAMPLE_CATALOG_JSON`].
    pub fn sample_catalog() -> Vec<Product> {
        vec![slim_fit_jeans(), summer_heels()]
    }

    /// A second, disjoint catalog.
    pub fn replacement_catalog() -> Vec<Product> {
        vec![
            Product::new("300", "20", "New Product", "Red", "Shirts"),
            Product::new("400", "30", "New Product 2", "Blue", "Shirts"),
        ]
    }

    /// In-memory backend seeded with [`sample_catalog`].
    pub fn sample_memory_source() -> MemoryInventorySource {
        MemoryInventorySource::with_products(sample_catalog())
    }

    /// Write [`SAMPLE_CATALOG_JSON`] into a fresh temp dir.
    ///
    /// Keep the returned `TempDir` alive for as long as the file is used.
    pub fn sample_catalog_file() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("products.json");
        std::fs::write(&path, SAMPLE_CATALOG_JSON).expect("write catalog file");
        (dir, path)
    }

    /// Write an arbitrary catalog as JSON into a fresh temp dir.
    pub fn catalog_file(products: &[Product]) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("products.json");
        let json = serde_json::to_string_pretty(products).expect("encode catalog");
        std::fs::write(&path, json).expect("write catalog file");
        (dir, path)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for inventory results.

    use super::*;

    /// Assert that a result is a storage error.
    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &InventoryResult<T>) {
        match result {
            Err(InventoryError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert that a result is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &InventoryResult<T>) {
        match result {
            Err(InventoryError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert two product lists hold the same ids in the same order.
    #[track_caller]
    pub fn assert_same_ids(actual: &[Product], expected: &[Product]) {
        let actual_ids: Vec<&str> = actual.iter().map(|p| p.id()).collect();
        let expected_ids: Vec<&str> = expected.iter().map(|p| p.id()).collect();
        assert_eq!(actual_ids, expected_ids, "product ids differ");
    }
}

// ============================================================================
// TESTS
// ============================================================================
