use bazaar::domain::FollowKey;
use bazaar::ports::FollowStore;
use moka::sync::Cache;
use std::fmt::Debug;
use std::time::Duration;

/// Moka-based follow store with optional size bound and TTL.
///
/// Unbounded with no TTL by default, so entries live for the whole session.
/// With a bound or TTL, an evicted key simply reads as unknown again.
pub struct MokaFollowStore {
    cache: Cache<FollowKey, bool>,
}

impl MokaFollowStore {
    /// Create an unbounded store whose entries live until cleared
    pub fn new_unbounded() -> Self {
        Self::new(None, None)
    }

    /// Create a store from optional capacity and TTL
    pub fn new(max_entries: Option<u64>, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().name("follow-status");

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }
}

impl Default for MokaFollowStore {
    fn default() -> Self {
        Self::new_unbounded()
    }
}

impl FollowStore for MokaFollowStore {
    fn get(&self, key: &FollowKey) -> Option<bool> {
        self.cache.get(key)
    }

    fn insert(&self, key: FollowKey, is_following: bool) {
        self.cache.insert(key, is_following);
    }

    fn clear(&self) {
        self.cache.invalidate_all();
    }

    fn len(&self) -> u64 {
        // entry_count lags until pending maintenance has run
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Debug for MokaFollowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaFollowStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
