use crate::cache::cache::{Cache, KeyType, Record, SetStatus, ValueRecord};
use crate::cache::error::{CacheError, Result};
use crate::cache::eviction_policy::EvictionPolicyManager;
use crate::cache::key_validator;
use crate::cache::locked_policy::LockedEvictionManager;
use crate::memory_store::shared_store_state::SharedStoreState;
use crate::server::timer;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

type Storage = DashMap<KeyType, Record>;

/// Capacity bounded key value store.
///
/// Reads go straight to the sharded map. Every mutation (insert, overwrite,
/// eviction, delete, expiry) runs under `write_lock`, so the map and the
/// eviction manager change together and the key sets stay equal.
pub struct CacheStore {
    memory: Storage,
    eviction: LockedEvictionManager<dyn EvictionPolicyManager>,
    write_lock: Mutex<()>,
    capacity: usize,
    max_key_size: usize,
    store_state: SharedStoreState,
}

impl CacheStore {
    pub fn new(
        timer: Arc<dyn timer::Timer + Send + Sync>,
        capacity: usize,
        max_key_size: usize,
        eviction: Box<dyn EvictionPolicyManager>,
    ) -> CacheStore {
        let parallelism = std::thread::available_parallelism().map_or(1, usize::from);
        let shards = Self::get_number_of_shards(parallelism);
        info!("Number of shards: {}", shards);
        CacheStore {
            memory: DashMap::with_shard_amount(shards),
            eviction: LockedEvictionManager::new(eviction),
            write_lock: Mutex::new(()),
            capacity,
            max_key_size,
            store_state: SharedStoreState::new(timer),
        }
    }

    // Four shards per available core, rounded up to a power of two
    // as dashmap requires, between 4 and 256.
    fn get_number_of_shards(parallelism: usize) -> usize {
        (parallelism.clamp(1, 64) * 4).next_power_of_two()
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    /// Caller must hold the write lock.
    fn evict_one(&self) -> Result<KeyType> {
        let candidate = self
            .eviction
            .key_to_remove()
            .ok_or_else(|| CacheError::internal("no eviction candidate in a full store"))?;
        if self.memory.remove(&candidate).is_none() {
            warn!("Eviction candidate {:?} was not stored", candidate);
        }
        self.eviction.delete(&candidate);
        debug!("Evicted key: {:?}", candidate);
        Ok(candidate)
    }

    /// Caller must hold the write lock. An overwrite may have happened
    /// since the key was seen expired, so expiry is checked again.
    fn remove_if_expired_locked(&self, key: &KeyType) -> bool {
        let removed = self
            .memory
            .remove_if(key, |_key, record| self.store_state.check_if_expired(record));
        if removed.is_some() {
            self.eviction.delete(key);
        }
        removed.is_some()
    }

    fn remove_if_expired(&self, key: &KeyType) {
        let _guard = self.lock_writes();
        if self.remove_if_expired_locked(key) {
            trace!("Expired key removed on read: {:?}", key);
        }
    }

    fn remove_expired(&self) -> usize {
        // scanned without the write lock so writers are not stalled
        let candidates: Vec<KeyType> = self
            .memory
            .iter()
            .filter(|entry| self.store_state.check_if_expired(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        if candidates.is_empty() {
            return 0;
        }

        let _guard = self.lock_writes();
        candidates
            .iter()
            .filter(|key| self.remove_if_expired_locked(key))
            .count()
    }
}

impl Cache for CacheStore {
    fn get(&self, keys: &[KeyType]) -> Result<Vec<ValueRecord>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let record = match self.memory.get(key) {
                Some(entry) => entry.value().clone(),
                None => continue,
            };
            if self.store_state.check_if_expired(&record) {
                self.remove_if_expired(key);
                continue;
            }
            self.eviction.get(key);
            values.push(ValueRecord::new(key.clone(), record));
        }
        Ok(values)
    }

    fn set(&self, key: KeyType, mut record: Record) -> Result<SetStatus> {
        key_validator::validate_key(&key, self.max_key_size)?;
        if self.capacity == 0 {
            return Err(CacheError::not_stored());
        }
        self.store_state.set_expiration(&mut record);

        let _guard = self.lock_writes();
        let mut evicted = None;
        if !self.memory.contains_key(&key) && self.memory.len() >= self.capacity {
            evicted = Some(self.evict_one()?);
        }
        self.eviction.add(&key);
        self.memory.insert(key, record);
        Ok(SetStatus { evicted })
    }

    fn delete(&self, key: KeyType) -> Result<Record> {
        let _guard = self.lock_writes();
        match self.memory.remove(&key) {
            Some((_key, record)) => {
                self.eviction.delete(&key);
                if self.store_state.check_if_expired(&record) {
                    return Err(CacheError::not_found());
                }
                Ok(record)
            }
            None => Err(CacheError::not_found()),
        }
    }

    fn run_pending_tasks(&self) {
        let removed = self.remove_expired();
        if removed > 0 {
            debug!("Removed {} expired entries", removed);
        }
    }

    fn len(&self) -> usize {
        self.memory.len()
    }

    fn keys(&self) -> Vec<KeyType> {
        self.memory.iter().map(|entry| entry.key().clone()).collect()
    }

    fn tracked_keys(&self) -> Vec<KeyType> {
        self.eviction.keys()
    }
}
