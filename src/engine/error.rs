use crate::model::BookingId;

use super::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Input rejected before any store call was made.
    Validation(&'static str),
    NotFound(BookingId),
    /// The store rejected the request or could not be reached.
    Store(String),
    Unauthorized(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "invalid input: {msg}"),
            EngineError::NotFound(id) => write!(f, "booking not found: {id}"),
            EngineError::Store(e) => write!(f, "store error: {e}"),
            EngineError::Unauthorized(msg) => write!(f, "not allowed: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            other => EngineError::Store(other.to_string()),
        }
    }
}
