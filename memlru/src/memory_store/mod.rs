pub mod cache_store;
pub mod shared_store_state;
