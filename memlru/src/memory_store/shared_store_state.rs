use crate::cache::cache::Record;
use crate::server::timer::Timer;
use std::sync::Arc;

/// State shared by store operations, currently the server clock
pub struct SharedStoreState {
    timer: Arc<dyn Timer + Send + Sync>,
}

impl SharedStoreState {
    pub fn new(timer: Arc<dyn Timer + Send + Sync>) -> SharedStoreState {
        SharedStoreState { timer }
    }

    pub fn timestamp(&self) -> u32 {
        self.timer.timestamp()
    }

    /// Turns the client supplied expiration hint into a server timestamp:
    /// 0 never expires, a positive value is relative to now and
    /// a negative value is already in the past.
    pub fn set_expiration(&self, record: &mut Record) {
        let now = self.timestamp();
        let time_to_live = record.header.get_expiration();
        record.header.expires_at = match time_to_live {
            0 => None,
            ttl if ttl < 0 => Some(now),
            ttl => {
                let ttl = u32::try_from(ttl).unwrap_or(u32::MAX);
                Some(now.saturating_add(ttl))
            }
        };
    }

    pub fn check_if_expired(&self, record: &Record) -> bool {
        match record.header.expires_at {
            Some(expires_at) => expires_at <= self.timestamp(),
            None => false,
        }
    }
}
