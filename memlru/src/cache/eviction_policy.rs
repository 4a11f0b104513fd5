use super::cache::KeyType;
use super::lru_policy::LruPolicy;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// evict the entry that was not set or read for the longest time
    #[value(alias = "lru")]
    LeastRecentlyUsed,
}

impl EvictionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::LeastRecentlyUsed => "LRU",
        }
    }

    pub fn create_manager(&self) -> Box<dyn EvictionPolicyManager> {
        match self {
            EvictionPolicy::LeastRecentlyUsed => Box::new(LruPolicy::new()),
        }
    }
}

/// Recency (or any other) bookkeeping used to pick eviction victims.
///
/// A manager only tracks key identifiers, values stay in the store. The
/// store has to keep both in sync: every key it holds is added, every key
/// it drops (including the one returned by `key_to_remove`) is deleted.
pub trait EvictionPolicyManager: Send {
    /// Returns the next eviction candidate without removing it.
    fn key_to_remove(&self) -> Option<KeyType>;

    /// Starts tracking a key or refreshes it when already tracked.
    fn add(&mut self, key: &KeyType);

    /// Stops tracking a key, no-op when absent.
    fn delete(&mut self, key: &KeyType);

    /// Records a read of a tracked key, no-op when absent.
    fn get(&mut self, key: &KeyType);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tracked keys, next eviction candidate first
    fn keys(&self) -> Vec<KeyType>;
}
