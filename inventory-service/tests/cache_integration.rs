//! End-to-end behaviour of the cached service over real backends.

use std::sync::Arc;
use std::time::Duration;

use inventory_service::{search, CachedInventoryService, InventoryService, SourceInventoryService};
use inventory_storage::{DiskInventorySource, InventorySource, MemoryInventorySource};
use inventory_test_utils::{
    assertions, fixtures, generators, init_test_tracing, CacheConfig, CountingInventoryService,
    FailingInventorySource, Product, Size,
};
use proptest::prelude::*;

const TTL: Duration = Duration::from_secs(300);

type CountingMemory = CountingInventoryService<SourceInventoryService<MemoryInventorySource>>;

async fn counting_cache(
    products: Vec<Product>,
) -> CachedInventoryService<CountingMemory> {
    init_test_tracing();
    let service = CountingInventoryService::new(SourceInventoryService::new(
        MemoryInventorySource::with_products(products),
    ));
    CachedInventoryService::with_config(service, CacheConfig::new().with_ttl(TTL))
        .await
        .unwrap()
}

fn backend(cache: &CachedInventoryService<CountingMemory>) -> &MemoryInventorySource {
    cache.inner().inner().source()
}

#[tokio::test(start_paused = true)]
async fn reads_within_ttl_do_not_reach_backend() {
    let cache = counting_cache(fixtures::sample_catalog()).await;

    let first = cache.get_all_products().await.unwrap();
    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get_all_products().await.unwrap(), first);
    }

    assert_eq!(cache.inner().counts().get_all(), 1);
    assert_eq!(cache.inner().counts().get(), 0);
}

#[tokio::test(start_paused = true)]
async fn out_of_band_change_is_seen_only_after_ttl() {
    let cache = counting_cache(fixtures::sample_catalog()).await;
    let p1 = cache.get_all_products().await.unwrap();

    // Change the backend behind the cache's back.
    backend(&cache).clear().unwrap();
    for product in fixtures::replacement_catalog() {
        backend(&cache).add(&product).await.unwrap();
    }

    tokio::time::advance(TTL - Duration::from_secs(1)).await;
    assert_eq!(cache.get_all_products().await.unwrap(), p1);

    tokio::time::advance(Duration::from_secs(2)).await;
    let p2 = cache.get_all_products().await.unwrap();
    assert_eq!(p2, fixtures::replacement_catalog());
    assert_eq!(cache.inner().counts().get_all(), 2);
}

#[tokio::test(start_paused = true)]
async fn get_product_matches_example_catalog() {
    let cache = counting_cache(fixtures::sample_catalog()).await;

    assert_eq!(
        cache.get_product("200").await.unwrap(),
        Some(fixtures::summer_heels())
    );
    assert_eq!(cache.get_product("999").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn add_is_visible_immediately() {
    let cache = counting_cache(fixtures::sample_catalog()).await;
    let product = Product::new("300", "40", "New Product 3", "Red", "Category 3");

    cache.add_product(&product).await.unwrap();

    assert_eq!(cache.get_product("300").await.unwrap(), Some(product));
    assert_eq!(cache.inner().counts().add(), 1);
    assert_eq!(cache.inner().counts().get_all(), 2);
}

#[tokio::test(start_paused = true)]
async fn update_on_missing_id_returns_false_without_refresh() {
    let cache = counting_cache(fixtures::sample_catalog()).await;

    let updated = cache
        .update_product(&Product::new("999", "1", "Ghost", "None", "None"))
        .await
        .unwrap();

    assert!(!updated);
    assert_eq!(cache.inner().counts().update(), 1);
    assert_eq!(cache.inner().counts().get_all(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_write_leaves_snapshot_untouched() {
    let cache = counting_cache(fixtures::sample_catalog()).await;
    cache.inner().failures().fail_writes(true);

    let result = cache
        .add_product(&Product::new("300", "40", "New Product 3", "Red", "Category 3"))
        .await;

    assertions::assert_storage_error(&result);
    assert_eq!(cache.inner().counts().get_all(), 1);
    assertions::assert_same_ids(
        &cache.get_all_products().await.unwrap(),
        &fixtures::sample_catalog(),
    );
}

#[tokio::test(start_paused = true)]
async fn refresh_failure_keeps_previous_snapshot_for_next_attempt() {
    let cache = counting_cache(fixtures::sample_catalog()).await;
    tokio::time::advance(TTL * 2).await;

    cache.inner().failures().fail_reads(true);
    assertions::assert_storage_error(&cache.get_all_products().await);
    assertions::assert_storage_error(&cache.get_product("100").await);

    cache.inner().failures().fail_reads(false);
    assert_eq!(
        cache.get_all_products().await.unwrap(),
        fixtures::sample_catalog()
    );
    assert_eq!(cache.stats().refresh_failures, 2);
}

#[tokio::test(start_paused = true)]
async fn burst_after_expiry_refreshes_once() {
    let cache = Arc::new(counting_cache(fixtures::sample_catalog()).await);
    tokio::time::advance(TTL + Duration::from_secs(1)).await;

    let mut handles = Vec::new();
    for i in 0..32 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                cache.get_all_products().await.map(|p| p.len())
            } else {
                cache
                    .search_products("", &search::name_contains)
                    .await
                    .map(|p| p.len())
            }
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 2);
    }

    assert_eq!(cache.inner().counts().get_all(), 2);
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_burst_after_invalidate_refreshes_once() {
    let cache = Arc::new(counting_cache(fixtures::sample_catalog()).await);
    cache.invalidate().await;

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_all_products().await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), fixtures::sample_catalog());
    }

    assert_eq!(cache.inner().counts().get_all(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_are_all_persisted() {
    let cache = Arc::new(counting_cache(Vec::new()).await);

    let handles: Vec<_> = (0..16i64)
        .map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .add_product(&Product::new(i.to_string(), i, "n", "c", "k"))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(cache.get_all_products().await.unwrap().len(), 16);
    assert_eq!(backend(&cache).len().unwrap(), 16);
}

#[tokio::test]
async fn disk_backed_stack_round_trip() {
    init_test_tracing();
    let (_dir, path) = fixtures::sample_catalog_file();
    let cache = CachedInventoryService::new(SourceInventoryService::new(
        DiskInventorySource::new(&path),
    ))
    .await
    .unwrap();

    let heels = cache.get_product("200").await.unwrap().unwrap();
    assert_eq!(heels, fixtures::summer_heels());

    let renamed = heels.clone().with_name("Winter heels");
    assert!(cache.update_product(&renamed).await.unwrap());
    assert_eq!(
        cache.get_product("200").await.unwrap().unwrap().name,
        "Winter heels"
    );

    let on_disk = DiskInventorySource::new(&path).get_all().await.unwrap();
    assert_eq!(on_disk[1].name, "Winter heels");
    assert_eq!(on_disk[0], fixtures::slim_fit_jeans());
}

#[tokio::test]
async fn disk_catalog_with_mixed_sizes_is_served_as_written() {
    init_test_tracing();
    let catalog = vec![
        Product::new("1", 7.5, "Sandals", "Brown", "Shoes"),
        Product::new("2", Size::dimensions(32, 30), "Chinos", "Beige", "Pants"),
        Product::new("3", "XL", "Hoodie", "Grey", "Shirts"),
        Product::new("4", Size::Unspecified, "Scarf", "Red", "Accessories"),
    ];
    let (_dir, path) = fixtures::catalog_file(&catalog);
    let cache = CachedInventoryService::new(SourceInventoryService::new(
        DiskInventorySource::new(&path),
    ))
    .await
    .unwrap();

    assert_eq!(cache.get_all_products().await.unwrap(), catalog);
    let shoes = cache
        .search_products("7.5", &search::matches_any_field)
        .await
        .unwrap();
    assert_eq!(shoes, vec![catalog[0].clone()]);
}

#[tokio::test]
async fn disk_write_failure_propagates_and_skips_refresh() {
    let (_dir, path) = fixtures::sample_catalog_file();
    let source = Arc::new(FailingInventorySource::new(DiskInventorySource::new(&path)));
    let cache = CachedInventoryService::new(CountingInventoryService::new(
        SourceInventoryService::new(Arc::clone(&source)),
    ))
    .await
    .unwrap();

    source.failures().fail_writes(true);
    let result = cache.add_product(&fixtures::summer_heels()).await;

    assertions::assert_storage_error(&result);
    assert_eq!(cache.inner().counts().get_all(), 1);
    assert_eq!(source.inner().get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn missing_catalog_file_fails_construction() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = CachedInventoryService::new(SourceInventoryService::new(
        DiskInventorySource::new(dir.path().join("absent.json")),
    ))
    .await;

    assertions::assert_storage_error(&result.map(|_| ()));
}

#[tokio::test]
async fn zero_ttl_is_a_config_error() {
    let result = CachedInventoryService::with_config(
        SourceInventoryService::new(MemoryInventorySource::new()),
        CacheConfig::new().with_ttl(Duration::ZERO),
    )
    .await;

    assertions::assert_config_error(&result.map(|_| ()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Search returns exactly the matching subset of the snapshot, in order.
    #[test]
    fn prop_search_is_ordered_filter_of_snapshot(
        catalog in generators::arb_catalog(24),
        query in "(Red|Blue|Pants|Shoes|[a-z]{1,2})",
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let cache = CachedInventoryService::new(SourceInventoryService::new(
                MemoryInventorySource::with_products(catalog.clone()),
            ))
            .await
            .unwrap();

            let found = cache
                .search_products(&query, &search::matches_any_field)
                .await
                .unwrap();
            let expected: Vec<Product> = catalog
                .iter()
                .filter(|p| search::matches_any_field(&query, p))
                .cloned()
                .collect();
            assert_eq!(found, expected);
        });
    }

    /// Every product in the snapshot is reachable by id; absent ids are None.
    #[test]
    fn prop_get_product_agrees_with_snapshot(catalog in generators::arb_catalog(24)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let cache = CachedInventoryService::new(SourceInventoryService::new(
                MemoryInventorySource::with_products(catalog.clone()),
            ))
            .await
            .unwrap();

            for product in &catalog {
                assert_eq!(cache.get_product(product.id()).await.unwrap().as_ref(), Some(product));
            }
            assert!(cache.get_product("not-a-numeric-id").await.unwrap().is_none());
        });
    }
}
