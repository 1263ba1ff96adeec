use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistressError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Domain error in {context}: {reason}")]
    DomainError { context: String, reason: String },

    #[error("Missing data for '{identifier}': {item}")]
    MissingData { identifier: String, item: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DistressError {
    pub(crate) fn missing(identifier: &str, item: impl std::fmt::Display) -> Self {
        DistressError::MissingData {
            identifier: identifier.to_string(),
            item: item.to_string(),
        }
    }
}

impl From<serde_json::Error> for DistressError {
    fn from(e: serde_json::Error) -> Self {
        DistressError::SerializationError(e.to_string())
    }
}
