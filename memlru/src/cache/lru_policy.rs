use super::cache::KeyType;
use super::eviction_policy::EvictionPolicyManager;
use lru::LruCache;

/// Least recently used ordering of keys.
///
/// Both writes and reads count as a touch. The underlying list is
/// unbounded, capacity is enforced by the store.
pub struct LruPolicy {
    order: LruCache<KeyType, ()>,
}

impl LruPolicy {
    pub fn new() -> LruPolicy {
        LruPolicy {
            order: LruCache::unbounded(),
        }
    }
}

impl Default for LruPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionPolicyManager for LruPolicy {
    fn key_to_remove(&self) -> Option<KeyType> {
        self.order.peek_lru().map(|(key, _)| key.clone())
    }

    fn add(&mut self, key: &KeyType) {
        // put moves an existing key to the most recent end
        self.order.put(key.clone(), ());
    }

    fn delete(&mut self, key: &KeyType) {
        self.order.pop(key);
    }

    fn get(&mut self, key: &KeyType) {
        self.order.promote(key);
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn keys(&self) -> Vec<KeyType> {
        // lru iterates from the most recent end
        self.order.iter().rev().map(|(key, _)| key.clone()).collect()
    }
}
