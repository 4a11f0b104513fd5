use crate::cache::cache::Cache;
use crate::cache::eviction_policy::EvictionPolicy;
use crate::cache::key_validator::DEFAULT_MAX_KEY_SIZE;
use crate::memcache::store::MemcStore;
use crate::memory_store::cache_store::CacheStore;
use crate::server::timer;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub struct MockSystemTimer {
    pub current_time: AtomicU32,
}

pub trait SetableTimer: timer::Timer {
    fn set(&self, time: u32);
    fn add_seconds(&self, seconds: u32);
}

impl MockSystemTimer {
    pub fn new() -> Self {
        MockSystemTimer {
            current_time: AtomicU32::new(0),
        }
    }
}

impl Default for MockSystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl timer::Timer for MockSystemTimer {
    fn timestamp(&self) -> u32 {
        self.current_time.load(Ordering::Acquire)
    }
}

impl SetableTimer for MockSystemTimer {
    fn set(&self, time: u32) {
        self.current_time.store(time, Ordering::Release)
    }

    fn add_seconds(&self, seconds: u32) {
        self.current_time.fetch_add(seconds, Ordering::Release);
    }
}

pub fn create_cache_store(capacity: usize) -> (Arc<CacheStore>, Arc<MockSystemTimer>) {
    let timer = Arc::new(MockSystemTimer::new());
    let store = Arc::new(CacheStore::new(
        timer.clone(),
        capacity,
        DEFAULT_MAX_KEY_SIZE,
        EvictionPolicy::LeastRecentlyUsed.create_manager(),
    ));
    (store, timer)
}

pub struct MockServer {
    pub timer: Arc<MockSystemTimer>,
    pub store: Arc<dyn Cache + Send + Sync>,
    pub storage: MemcStore,
}

impl MockServer {
    pub fn new(store: Arc<dyn Cache + Send + Sync>, timer: Arc<MockSystemTimer>) -> Self {
        MockServer {
            timer,
            store: store.clone(),
            storage: MemcStore::new(store),
        }
    }
}

pub fn create_server(capacity: usize) -> MockServer {
    let (store, timer) = create_cache_store(capacity);
    MockServer::new(store, timer)
}
