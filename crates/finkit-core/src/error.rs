use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinkitError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Safety cap exceeded: {context} ran past {limit} periods; check inputs")]
    SafetyCapExceeded { context: String, limit: u32 },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl FinkitError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FinkitError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinkitError {
    fn from(e: serde_json::Error) -> Self {
        FinkitError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for FinkitError {
    fn from(e: std::io::Error) -> Self {
        FinkitError::Io(e.to_string())
    }
}

impl From<chrono::ParseError> for FinkitError {
    fn from(e: chrono::ParseError) -> Self {
        FinkitError::DateError(e.to_string())
    }
}
