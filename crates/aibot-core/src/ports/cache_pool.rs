//! Cache pool port.
//!
//! Repositories read through the cache on by-id selects and invalidate the
//! entry on every update or delete of that row. The cache is best-effort:
//! an entry may be missing or evicted at any time.

use std::any::Any;
use std::sync::Arc;

/// Stored cache value. Entries are shared, never mutated in place.
pub type CacheValue = Arc<dyn Any + Send + Sync>;

/// Which kind of row a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheRegion {
    User,
    Question,
    Answer,
    Tag,
    Favorite,
}

/// Key of a cache entry: a row id within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub region: CacheRegion,
    pub id: i64,
}

impl CacheKey {
    #[must_use]
    pub const fn new(region: CacheRegion, id: i64) -> Self {
        Self { region, id }
    }
}

/// Shared key/value cache injected into the repositories.
pub trait CachePool: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CacheValue>;

    fn set(&self, key: CacheKey, value: CacheValue);

    fn invalidate(&self, key: &CacheKey);

    fn clear(&self);
}

impl dyn CachePool {
    /// Typed lookup. An entry of another type counts as a miss.
    pub fn get_as<T: Clone + 'static>(&self, key: &CacheKey) -> Option<T> {
        self.get(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    /// Typed insert.
    pub fn put<T: Send + Sync + 'static>(&self, key: CacheKey, value: T) {
        self.set(key, Arc::new(value));
    }
}
