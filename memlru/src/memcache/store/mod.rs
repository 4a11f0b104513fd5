use crate::cache::cache::{Cache, KeyType as CacheKeyType, Record as CacheRecord};
use crate::memcache::response::Response;
use std::sync::Arc;

pub type Record = CacheRecord;
pub type KeyType = CacheKeyType;

/**
 * Implements memcache commands on top of
 * a capacity bounded store
 */
pub struct MemcStore {
    store: Arc<dyn Cache + Send + Sync>,
}

impl MemcStore {
    pub fn new(store: Arc<dyn Cache + Send + Sync>) -> MemcStore {
        MemcStore { store }
    }

    pub fn set(&self, key: KeyType, record: Record) -> Response {
        let result = self.store.set(key, record).map(|status| {
            if let Some(evicted) = status.evicted {
                trace!("Set evicted: {:?}", evicted);
            }
        });
        Response::Set(result)
    }

    pub fn get(&self, keys: &[KeyType]) -> Response {
        Response::Get(self.store.get(keys))
    }

    pub fn delete(&self, key: KeyType) -> Response {
        Response::Delete(self.store.delete(key).map(|_record| ()))
    }
}
