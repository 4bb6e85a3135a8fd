mod common;

use std::sync::Barrier;
use std::time::Duration;

use common::{Fixture, MemorySource};
use mdict_engine::engine::index::{CacheKey, HeadwordIndex, IndexCache};

const THREADS: usize = 8;

#[test]
fn concurrent_first_lookups_build_once() {
    let fixture = Fixture::with(MemorySource::with_delay(Duration::from_millis(100)), |_| {});
    fixture.add_dictionary(1, "dict", &[("word", "<p>def</p>")]);

    let barrier = Barrier::new(THREADS);
    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                barrier.wait();
                let result = fixture.engine.lookup(1, "word").unwrap();
                assert_eq!(result.entries.len(), 1);
            });
        }
    });

    assert_eq!(fixture.source.builds(), 1);
    let stats = fixture.engine.headword_cache_stats();
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.hits, THREADS as u64 - 1);
}

#[test]
fn concurrent_lookups_in_different_dictionaries() {
    let fixture = Fixture::with(MemorySource::with_delay(Duration::from_millis(20)), |_| {});
    for id in 1..=4 {
        fixture.add_dictionary(id, &format!("dict{}", id), &[("word", "<p>def</p>")]);
    }

    let barrier = Barrier::new(THREADS);
    std::thread::scope(|scope| {
        for i in 0..THREADS {
            let barrier = &barrier;
            let fixture = &fixture;
            scope.spawn(move || {
                barrier.wait();
                let id = (i % 4) as i64 + 1;
                assert!(fixture.engine.lookup(id, "word").unwrap().found);
            });
        }
    });

    assert_eq!(fixture.source.builds(), 4);
}

#[test]
fn least_recently_used_index_is_evicted() {
    let fixture = Fixture::with(MemorySource::default(), |config| {
        config.headword_cache_capacity = 1;
    });
    fixture.add_dictionary(1, "one", &[("a", "1")]);
    fixture.add_dictionary(2, "two", &[("a", "2")]);
    let cache = &fixture.engine.index_cache().headwords;

    fixture.engine.lookup(1, "a").unwrap();
    assert_eq!(cache.len(), 1);
    fixture.engine.lookup(2, "a").unwrap();
    assert_eq!(cache.len(), 1);

    // Dictionary 1 was evicted and has to be rebuilt.
    fixture.engine.lookup(1, "a").unwrap();
    assert_eq!(fixture.source.builds(), 3);
    assert_eq!(cache.len(), 1);
    assert!(fixture.engine.headword_cache_stats().evictions >= 1);
}

#[test]
fn invalidate_dictionary_only_drops_its_own_entries() {
    let cache = IndexCache::new(4, 4);
    for (id, path) in [(1, "/d/one.mdx"), (1, "/d/one-v2.mdx"), (2, "/d/two.mdx")] {
        cache
            .headwords
            .get_or_build(CacheKey::new(id, path), || Ok(HeadwordIndex::default()))
            .unwrap();
    }
    assert_eq!(cache.headwords.len(), 3);

    cache.invalidate_dictionary(1);
    assert_eq!(cache.headwords.len(), 1);
    assert!(cache.headwords.contains(&CacheKey::new(2, "/d/two.mdx")));
    assert!(!cache.headwords.contains(&CacheKey::new(1, "/d/one.mdx")));
}

#[test]
fn failed_build_is_shared_but_not_stored() {
    let cache = IndexCache::new(4, 4);
    let key = CacheKey::new(1, "/d/broken.mdx");

    let err = cache
        .headwords
        .get_or_build(key.clone(), || {
            Err(mdict_engine::SourceError::InvalidFormat("truncated".to_string()))
        })
        .unwrap_err();
    assert!(err.to_string().contains("truncated"));
    assert!(!cache.headwords.contains(&key));

    cache
        .headwords
        .get_or_build(key.clone(), || Ok(HeadwordIndex::default()))
        .unwrap();
    assert!(cache.headwords.contains(&key));
    assert_eq!(cache.headwords.stats().builds, 2);
}
