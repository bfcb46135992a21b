//! Time-limited cache of fetched signal tables.
//!
//! Keyed by source, the sorted tool set, the month range and the region, so
//! the same request asked twice within the TTL is answered locally. Expired
//! entries are evicted when they are looked up.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;
use toolrank_common::{MonthKey, Table, ToolName};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub tools: Vec<ToolName>,
    pub start: MonthKey,
    pub end: MonthKey,
    pub region: String,
}

impl CacheKey {
    /// Tool order does not matter; the key holds them sorted and deduplicated.
    pub fn new(source: &str, tools: &[ToolName], start: MonthKey, end: MonthKey, region: &str) -> Self {
        let mut tools = tools.to_vec();
        tools.sort();
        tools.dedup();
        Self {
            source: source.to_string(),
            tools,
            start,
            end,
            region: region.to_string(),
        }
    }
}

struct Entry {
    stored_at: Instant,
    table: Table,
}

#[derive(Clone)]
pub struct FetchCache {
    entries: Arc<Mutex<LruCache<CacheKey, Entry>>>,
    ttl: Duration,
}

impl FetchCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<Table> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => entry.stored_at.elapsed() >= self.ttl,
        };
        if expired {
            entries.pop(key);
            debug!(source = %key.source, "Cache entry expired");
            return None;
        }
        debug!(source = %key.source, tools = key.tools.len(), "Cache hit");
        entries.get(key).map(|entry| entry.table.clone())
    }

    pub fn put(&self, key: CacheKey, table: Table) {
        self.lock().put(key, Entry { stored_at: Instant::now(), table });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrank_test_utils::{month, series_table};

    fn key(tools: &[&str]) -> CacheKey {
        let tools: Vec<ToolName> = tools.iter().map(|t| t.to_string()).collect();
        CacheKey::new("trends", &tools, month("2024-01"), month("2024-06"), "US")
    }

    #[test]
    fn test_hit_before_expiry() {
        let cache = FetchCache::default();
        let table = series_table("A", "2024-01", &[Some(1.0)]);
        cache.put(key(&["A", "B"]), table.clone());
        assert_eq!(cache.get(&key(&["B", "A"])), Some(table));
    }

    #[test]
    fn test_miss_after_expiry_evicts() {
        let cache = FetchCache::new(Duration::ZERO, 8);
        cache.put(key(&["A"]), series_table("A", "2024-01", &[Some(1.0)]));
        assert_eq!(cache.get(&key(&["A"])), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_distinguishes_region_and_range() {
        let tools = vec!["A".to_string()];
        let us = CacheKey::new("trends", &tools, month("2024-01"), month("2024-06"), "US");
        let global = CacheKey::new("trends", &tools, month("2024-01"), month("2024-06"), "");
        let longer = CacheKey::new("trends", &tools, month("2024-01"), month("2024-07"), "US");
        assert_ne!(us, global);
        assert_ne!(us, longer);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let cache = FetchCache::new(DEFAULT_TTL, 1);
        cache.put(key(&["A"]), Table::new());
        cache.put(key(&["B"]), Table::new());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key(&["A"])).is_none());
    }
}
