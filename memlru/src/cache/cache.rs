use super::error::Result;
use bytes::Bytes;

/// Cache key type
pub type KeyType = Bytes;

/// Cache value associated with a key
pub type ValueType = Bytes;

/// Meta data stored with cache value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheMetaData {
    pub(crate) flags: u32,
    /// Expiration hint exactly as supplied by the client
    pub(crate) time_to_live: i64,
    /// Server timestamp after which the record is gone, `None` means never
    pub(crate) expires_at: Option<u32>,
}

impl CacheMetaData {
    pub fn new(flags: u32, time_to_live: i64) -> CacheMetaData {
        CacheMetaData {
            flags,
            time_to_live,
            expires_at: None,
        }
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn get_expiration(&self) -> i64 {
        self.time_to_live
    }
}

/// Value and meta data stored in cache
#[derive(Clone, Debug)]
pub struct Record {
    pub(crate) header: CacheMetaData,
    pub(crate) value: ValueType,
}

impl Record {
    pub fn new(value: ValueType, flags: u32, expiration: i64) -> Record {
        let header = CacheMetaData::new(flags, expiration);
        Record { header, value }
    }

    /// Byte length of the value, derived from the value itself so
    /// it can never disagree with it.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.header.flags == other.header.flags
    }
}

/// Single hit returned by a multi key get
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueRecord {
    pub key: KeyType,
    pub flags: u32,
    pub bytes: usize,
    pub data: ValueType,
}

impl ValueRecord {
    pub fn new(key: KeyType, record: Record) -> ValueRecord {
        ValueRecord {
            key,
            flags: record.header.flags,
            bytes: record.value.len(),
            data: record.value,
        }
    }
}

/// Result of set operation on cache
#[derive(Debug, PartialEq, Eq)]
pub struct SetStatus {
    /// Key removed to make room for the new one
    pub evicted: Option<KeyType>,
}

// An abstraction over a capacity bounded key <=> value store
pub trait Cache {
    /// Returns values of the keys that are present, in request order.
    /// Missing or expired keys are omitted, a miss is not an error.
    fn get(&self, keys: &[KeyType]) -> Result<Vec<ValueRecord>>;

    /// Inserts or overwrites a value. Inserting a new key into a full
    /// store evicts exactly one entry chosen by the eviction policy.
    fn set(&self, key: KeyType, record: Record) -> Result<SetStatus>;

    /// Removes a value associated with a key and returns it.
    ///
    /// - if key is not found NotFound is returned
    fn delete(&self, key: KeyType) -> Result<Record>;

    /// runs pending tasks (if any)
    /// will be scheduled periodically
    fn run_pending_tasks(&self);

    /// Number of entries currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys currently held, in no particular order
    fn keys(&self) -> Vec<KeyType>;

    /// Keys tracked by the eviction policy, least recently used first
    fn tracked_keys(&self) -> Vec<KeyType>;
}
