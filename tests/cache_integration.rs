//! Integration tests for the bounded response cache.
//!
//! These pin the externally observable eviction contract: exact byte
//! accounting, strict creation-time FIFO order, and best-effort
//! admission of oversized entries.

use std::time::Duration;

use metasearch::cache::ResponseCache;
use metasearch::config::CacheConfig;
use metasearch::types::{SearchResponse, SearchResult};

fn response_with_payload(query: &str, payload_len: usize) -> SearchResponse {
    SearchResponse {
        query: query.to_owned(),
        results: vec![SearchResult {
            title: "x".repeat(payload_len),
            snippet: String::new(),
            link: "https://example.com".into(),
            inner_content: None,
            source: "Test".into(),
        }],
        formatted_result: None,
        duration_ms: 0,
    }
}

fn cache_with(max_items: usize, max_bytes: u64) -> ResponseCache {
    ResponseCache::new(&CacheConfig {
        max_items,
        max_bytes,
        default_ttl_seconds: 0,
        cleanup_interval_seconds: 600,
    })
}

#[test]
fn three_inserts_two_slots_evicts_the_oldest() {
    // max_items=2, max_bytes=1_000_000: insert "a", "b", "c" in order.
    // After "c", "a" (the oldest created) is gone and {b, c} remain.
    let cache = cache_with(2, 1_000_000);

    cache.set("a", response_with_payload("a", 100)).expect("set a");
    cache.set("b", response_with_payload("b", 100)).expect("set b");
    cache.set("c", response_with_payload("c", 100)).expect("set c");

    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_some());
    assert!(cache.get("c").is_some());
    assert_eq!(cache.stats().item_count, 2);
}

#[test]
fn accounting_invariant_holds_after_every_set() {
    let cache = cache_with(5, 4_000);
    let mut expected_sizes: Vec<(String, u64)> = Vec::new();

    for (i, key) in ["q1", "q2", "q3", "q4", "q5", "q6", "q7"].iter().enumerate() {
        let value = response_with_payload(key, 50 + i * 120);
        let size = serde_json::to_vec(&value).expect("serialize").len() as u64;
        expected_sizes.push(((*key).to_owned(), size));

        cache.set(key, value).expect("set");

        let stats = cache.stats();
        assert!(stats.item_count <= 5, "item count exceeded max_items");

        // bytes_used must equal the sum of sizes of entries still live.
        let live_sum: u64 = expected_sizes
            .iter()
            .filter(|(k, _)| cache.get(k).is_some())
            .map(|(_, s)| *s)
            .sum();
        assert_eq!(stats.bytes_used, live_sum);
    }
}

#[test]
fn fifo_order_unaffected_by_reads() {
    let cache = cache_with(3, 1_000_000);
    cache.set("a", response_with_payload("a", 10)).expect("set");
    cache.set("b", response_with_payload("b", 10)).expect("set");
    cache.set("c", response_with_payload("c", 10)).expect("set");

    // Hammer the oldest entry with reads; it must still go first.
    for _ in 0..100 {
        assert!(cache.get("a").is_some());
    }

    cache.set("d", response_with_payload("d", 10)).expect("set");
    assert!(cache.get("a").is_none(), "reads must not refresh recency");
    assert!(cache.get("b").is_some());

    cache.set("e", response_with_payload("e", 10)).expect("set");
    assert!(cache.get("b").is_none(), "eviction continues in creation order");
    assert!(cache.get("c").is_some());
    assert!(cache.get("d").is_some());
    assert!(cache.get("e").is_some());
}

#[test]
fn byte_pressure_alone_triggers_eviction() {
    let probe = response_with_payload("probe", 400);
    let one_size = serde_json::to_vec(&probe).expect("serialize").len() as u64;
    let cache = cache_with(100, one_size * 2 + 1);

    cache.set("a", response_with_payload("a", 400)).expect("set");
    cache.set("b", response_with_payload("b", 400)).expect("set");
    cache.set("c", response_with_payload("c", 400)).expect("set");

    let stats = cache.stats();
    assert_eq!(stats.item_count, 2, "byte limit holds two entries");
    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_some());
    assert!(cache.get("c").is_some());
}

#[test]
fn oversized_entry_admitted_after_evicting_everything() {
    let cache = cache_with(100, 500);

    cache.set("small", response_with_payload("small", 50)).expect("set");
    // Far larger than max_bytes on its own; still admitted.
    cache.set("huge", response_with_payload("huge", 5_000)).expect("set");

    assert!(cache.get("small").is_none());
    assert!(cache.get("huge").is_some());

    let stats = cache.stats();
    assert_eq!(stats.item_count, 1);
    assert!(
        stats.bytes_used > 500,
        "best-effort capping: a single oversized entry may exceed max_bytes"
    );
}

#[test]
fn round_trip_returns_equal_value() {
    let cache = cache_with(10, 1_000_000);
    let value = response_with_payload("roundtrip", 64);
    cache.set("roundtrip", value.clone()).expect("set");

    let cached = cache.get("roundtrip").expect("hit");
    assert_eq!(cached.query, value.query);
    assert_eq!(cached.results.len(), value.results.len());
    assert_eq!(cached.results[0].title, value.results[0].title);
}

#[test]
fn expiry_applies_independently_of_pressure() {
    let cache = ResponseCache::new(&CacheConfig {
        max_items: 100,
        max_bytes: 1_000_000,
        default_ttl_seconds: 1,
        cleanup_interval_seconds: 600,
    });
    cache.set("a", response_with_payload("a", 10)).expect("set");

    std::thread::sleep(Duration::from_millis(1200));

    assert!(cache.get("a").is_none(), "entry expired without any pressure");
    assert_eq!(cache.remove_expired(), 1);
    assert_eq!(cache.stats().bytes_used, 0);
}

#[test]
fn concurrent_readers_and_writers_keep_accounting_exact() {
    use std::sync::Arc;

    let cache = Arc::new(cache_with(8, 1_000_000));
    let mut handles = Vec::new();

    for t in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(std::thread::spawn(move || {
            for i in 0..50 {
                let key = format!("t{t}-q{}", i % 10);
                cache
                    .set(&key, response_with_payload(&key, 20 + i))
                    .expect("set");
                let _ = cache.get(&key);
                let stats = cache.stats();
                assert!(stats.item_count <= 8);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread");
    }

    // After the dust settles, bytes_used equals the sum over live entries.
    let metrics = cache.metrics();
    assert!(metrics.item_count <= 8);
    assert_eq!(metrics.bytes_used, cache.stats().bytes_used);
    assert!(metrics.items_used_percent <= 100.0);
}
