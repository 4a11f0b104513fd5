use crate::cache::cache::ValueRecord;
use crate::cache::error::{CacheError, Result};

/// Outcome of a single command, one variant per command kind.
#[derive(Debug, PartialEq)]
pub enum Response {
    /// Hits in request order, misses are simply absent
    Get(Result<Vec<ValueRecord>>),
    Set(Result<()>),
    Delete(Result<()>),
    /// Unrecognized or malformed command, always a failure
    Invalid(CacheError),
}

impl Response {
    pub fn is_success(&self) -> bool {
        match self {
            Response::Get(result) => result.is_ok(),
            Response::Set(result) | Response::Delete(result) => result.is_ok(),
            Response::Invalid(_) => false,
        }
    }

    pub fn error(&self) -> Option<&CacheError> {
        match self {
            Response::Get(result) => result.as_ref().err(),
            Response::Set(result) | Response::Delete(result) => result.as_ref().err(),
            Response::Invalid(err) => Some(err),
        }
    }

    /// Empty on success
    pub fn error_message(&self) -> &str {
        self.error().map_or("", |err| err.message())
    }
}
