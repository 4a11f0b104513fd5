#[allow(clippy::module_inception)]
pub mod cache;
pub mod error;
pub mod eviction_policy;
pub mod key_validator;
pub mod locked_policy;
pub mod lru_policy;
pub mod pending_tasks_runner;
