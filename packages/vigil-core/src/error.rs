use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("malformed sample: {0}")]
    MalformedSample(String),

    #[error("wrong field count: expected at least {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("non-numeric field: {0}")]
    NonNumeric(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
