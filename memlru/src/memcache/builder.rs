use crate::cache::cache::Cache;
use crate::cache::eviction_policy::EvictionPolicy;
use crate::memory_store::cache_store::CacheStore;
use crate::server::timer;
use std::sync::Arc;

#[derive(Clone, Copy, Debug)]
pub struct MemcacheStoreConfig {
    policy: EvictionPolicy,
    capacity: usize,
    max_key_size: usize,
}

impl MemcacheStoreConfig {
    pub fn new(policy: EvictionPolicy, capacity: usize, max_key_size: usize) -> MemcacheStoreConfig {
        MemcacheStoreConfig {
            policy,
            capacity,
            max_key_size,
        }
    }
}

pub struct MemcacheStoreBuilder {}

impl MemcacheStoreBuilder {
    pub fn from_config(
        config: MemcacheStoreConfig,
        timer: Arc<dyn timer::Timer + Send + Sync>,
    ) -> Arc<dyn Cache + Send + Sync> {
        debug!(
            "Creating store, policy: {}, capacity: {}",
            config.policy.as_str(),
            config.capacity
        );
        Arc::new(CacheStore::new(
            timer,
            config.capacity,
            config.max_key_size,
            config.policy.create_manager(),
        ))
    }
}
