use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("computation failed: {0}")]
    Computation(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self { EngineError::Malformed(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, EngineError>;
