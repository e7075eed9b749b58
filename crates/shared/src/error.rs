use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Configuration,
    Transaction,
    Extraction,
    NotFound,
    TransientFetch,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CounterError {
    #[error("{0}")]
    Configuration(String),
    #[error("Transaction failed: {0}")]
    Transaction(String),
    #[error("Transaction completed but no object ID could be found.")]
    Extraction,
    #[error("Not found")]
    NotFound,
    #[error("Error: {0}")]
    TransientFetch(String),
}

impl CounterError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CounterError::Configuration(_) => ErrorCode::Configuration,
            CounterError::Transaction(_) => ErrorCode::Transaction,
            CounterError::Extraction => ErrorCode::Extraction,
            CounterError::NotFound => ErrorCode::NotFound,
            CounterError::TransientFetch(_) => ErrorCode::TransientFetch,
        }
    }

    /// Whether on-chain state may have changed even though the call failed.
    pub fn state_may_have_changed(&self) -> bool {
        matches!(self, CounterError::Extraction)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&CounterError> for ErrorReport {
    fn from(value: &CounterError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
