use super::cache::KeyType;
use super::eviction_policy::EvictionPolicyManager;
use parking_lot::{Mutex, MutexGuard};

/// Serializes every call to the wrapped manager behind a single lock.
///
/// All connections funnel through this lock, so it is a global choke point.
/// Critical sections only touch key metadata and stay short; sharding it
/// would need a per shard eviction order.
pub struct LockedEvictionManager<P: EvictionPolicyManager + ?Sized> {
    inner: Mutex<Box<P>>,
}

impl<P: EvictionPolicyManager + ?Sized> LockedEvictionManager<P> {
    pub fn new(manager: Box<P>) -> Self {
        LockedEvictionManager {
            inner: Mutex::new(manager),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<P>> {
        self.inner.lock()
    }

    pub fn key_to_remove(&self) -> Option<KeyType> {
        self.lock().key_to_remove()
    }

    pub fn add(&self, key: &KeyType) {
        self.lock().add(key);
    }

    pub fn delete(&self, key: &KeyType) {
        self.lock().delete(key);
    }

    pub fn get(&self, key: &KeyType) {
        self.lock().get(key);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn keys(&self) -> Vec<KeyType> {
        self.lock().keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::lru_policy::LruPolicy;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::thread;

    fn create_manager() -> LockedEvictionManager<dyn EvictionPolicyManager> {
        LockedEvictionManager::<dyn EvictionPolicyManager>::new(Box::new(LruPolicy::new()))
    }

    #[test]
    fn forwards_to_wrapped_manager() {
        let manager = create_manager();
        manager.add(&Bytes::from("a"));
        manager.add(&Bytes::from("b"));
        manager.get(&Bytes::from("a"));
        assert_eq!(manager.key_to_remove(), Some(Bytes::from("b")));
        manager.delete(&Bytes::from("b"));
        assert_eq!(manager.keys(), vec![Bytes::from("a")]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn concurrent_adds_keep_one_instance_per_key() {
        let manager = Arc::new(create_manager());
        let handles: Vec<_> = (0..8)
            .map(|thread_id| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for idx in 0..100 {
                        let key = Bytes::from(format!("key-{}", (idx + thread_id) % 50));
                        manager.add(&key);
                        manager.get(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(manager.len(), 50);
    }

    #[test]
    fn panic_while_locked_does_not_block_later_calls() {
        let manager = Arc::new(create_manager());
        manager.add(&Bytes::from("a"));
        let holder = Arc::clone(&manager);
        let result = thread::spawn(move || {
            let _guard = holder.inner.lock();
            panic!("panic while holding the lock");
        })
        .join();
        assert!(result.is_err());

        manager.add(&Bytes::from("b"));
        assert_eq!(manager.keys(), vec![Bytes::from("a"), Bytes::from("b")]);
    }
}
