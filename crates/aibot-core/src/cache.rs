//! In-process cache pool implementations.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::ports::{CacheKey, CachePool, CacheValue};

struct Entry {
    value: CacheValue,
    inserted: Instant,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    next_seq: u64,
}

/// `HashMap`-backed cache with optional capacity and time-to-live.
///
/// When full, the entry inserted first is evicted. Expired entries are
/// dropped lazily on lookup.
#[derive(Default)]
pub struct MemoryCachePool {
    inner: RwLock<Inner>,
    capacity: Option<usize>,
    ttl: Option<Duration>,
}

impl MemoryCachePool {
    /// Unbounded cache without expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl.is_some_and(|ttl| entry.inserted.elapsed() >= ttl)
    }
}

impl CachePool for MemoryCachePool {
    fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            match inner.entries.get(key) {
                None => return None,
                Some(entry) if !self.is_expired(entry) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.entries.get(key).is_some_and(|e| self.is_expired(e)) {
            inner.entries.remove(key);
            tracing::trace!(?key, "cache entry expired");
        }
        None
    }

    fn set(&self, key: CacheKey, value: CacheValue) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while !inner.entries.contains_key(&key) && inner.entries.len() >= capacity {
                let oldest = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.seq)
                    .map(|(k, _)| *k);
                match oldest {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            Entry {
                value,
                inserted: Instant::now(),
                seq,
            },
        );
    }

    fn invalidate(&self, key: &CacheKey) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .remove(key);
    }

    fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clear();
    }
}

/// Cache that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCachePool;

impl CachePool for NoopCachePool {
    fn get(&self, _key: &CacheKey) -> Option<CacheValue> {
        None
    }

    fn set(&self, _key: CacheKey, _value: CacheValue) {}

    fn invalidate(&self, _key: &CacheKey) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ports::CacheRegion;

    fn key(id: i64) -> CacheKey {
        CacheKey::new(CacheRegion::User, id)
    }

    #[test]
    fn typed_get_round_trips() {
        let pool: Arc<dyn CachePool> = Arc::new(MemoryCachePool::new());
        pool.put(key(1), String::from("alice"));
        assert_eq!(pool.get_as::<String>(&key(1)), Some("alice".to_string()));
        assert_eq!(pool.get_as::<i64>(&key(1)), None);
        assert_eq!(pool.get_as::<String>(&key(2)), None);
    }

    #[test]
    fn regions_do_not_collide() {
        let pool: Arc<dyn CachePool> = Arc::new(MemoryCachePool::new());
        pool.put(CacheKey::new(CacheRegion::User, 1), 10_i64);
        pool.put(CacheKey::new(CacheRegion::Tag, 1), 20_i64);
        assert_eq!(pool.get_as::<i64>(&CacheKey::new(CacheRegion::User, 1)), Some(10));
        assert_eq!(pool.get_as::<i64>(&CacheKey::new(CacheRegion::Tag, 1)), Some(20));
    }

    #[test]
    fn invalidate_and_clear() {
        let pool = MemoryCachePool::new();
        pool.set(key(1), Arc::new(1_i64));
        pool.set(key(2), Arc::new(2_i64));
        pool.invalidate(&key(1));
        assert!(pool.get(&key(1)).is_none());
        assert!(pool.get(&key(2)).is_some());
        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest_insertion() {
        let pool = MemoryCachePool::new().with_capacity(2);
        pool.set(key(1), Arc::new(1_i64));
        pool.set(key(2), Arc::new(2_i64));
        pool.set(key(3), Arc::new(3_i64));
        assert_eq!(pool.len(), 2);
        assert!(pool.get(&key(1)).is_none());
        assert!(pool.get(&key(3)).is_some());
    }

    #[test]
    fn overwriting_does_not_evict() {
        let pool = MemoryCachePool::new().with_capacity(2);
        pool.set(key(1), Arc::new(1_i64));
        pool.set(key(2), Arc::new(2_i64));
        pool.set(key(2), Arc::new(22_i64));
        assert_eq!(pool.len(), 2);
        assert!(pool.get(&key(1)).is_some());
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let pool = MemoryCachePool::new().with_ttl(Duration::ZERO);
        pool.set(key(1), Arc::new(1_i64));
        assert!(pool.get(&key(1)).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn noop_pool_stores_nothing() {
        let pool = NoopCachePool;
        pool.set(key(1), Arc::new(1_i64));
        assert!(pool.get(&key(1)).is_none());
    }
}
