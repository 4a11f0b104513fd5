use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidKey,
    MissingParameter,
    MalformedCommand,
    NotFound,
    NotStored,
    InternalError,
    UnknownCommand,
    ValueTooLarge,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidKey => "Invalid key",
            ErrorKind::MissingParameter => "Missing parameter",
            ErrorKind::MalformedCommand => "Malformed command",
            ErrorKind::NotFound => "Not found",
            ErrorKind::NotStored => "Item not stored",
            ErrorKind::InternalError => "Internal error",
            ErrorKind::UnknownCommand => "Unknown command",
            ErrorKind::ValueTooLarge => "Value too big",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheError {
    kind: ErrorKind,
    message: String,
}

impl CacheError {
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M) -> CacheError {
        CacheError {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_key<M: Into<String>>(message: M) -> CacheError {
        CacheError::new(ErrorKind::InvalidKey, message)
    }

    pub fn missing_parameter<M: Into<String>>(message: M) -> CacheError {
        CacheError::new(ErrorKind::MissingParameter, message)
    }

    pub fn malformed<M: Into<String>>(message: M) -> CacheError {
        CacheError::new(ErrorKind::MalformedCommand, message)
    }

    pub fn internal<M: Into<String>>(message: M) -> CacheError {
        CacheError::new(ErrorKind::InternalError, message)
    }

    pub fn not_found() -> CacheError {
        CacheError::new(ErrorKind::NotFound, ErrorKind::NotFound.as_str())
    }

    pub fn not_stored() -> CacheError {
        CacheError::new(ErrorKind::NotStored, ErrorKind::NotStored.as_str())
    }

    pub fn unknown_command() -> CacheError {
        CacheError::new(ErrorKind::UnknownCommand, ErrorKind::UnknownCommand.as_str())
    }

    pub fn value_too_large() -> CacheError {
        CacheError::new(ErrorKind::ValueTooLarge, "object too large for cache")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for CacheError {}

pub type Result<T> = std::result::Result<T, CacheError>;
