use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum RamifyError {
    /// Local, synchronous rejection: over-length instruction, oversized tree. The request
    /// in question was never dispatched.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The external concept source failed or returned an unusable payload. The tree is left
    /// untouched.
    #[error("Concept source error: {0}")]
    Collaborator(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<JsonError> for RamifyError {
    fn from(src: JsonError) -> RamifyError {
        RamifyError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}
