#[macro_use]
extern crate log;

#[allow(clippy::module_inception)]
pub mod cache;
pub mod memcache;
pub mod memcache_server;
pub mod memory_store;
pub mod protocol;
pub mod server;
pub mod version;

#[cfg(test)]
mod mock;
