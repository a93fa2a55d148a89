//! Text generation errors

use thiserror::Error;

/// Failure reported by a text-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("text generation failed: {0}")]
    Failed(String),

    #[error("text generation returned an empty reply")]
    EmptyReply,
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Failed(_) => "NC_GENERATION_FAILED",
            GenerationError::EmptyReply => "NC_GENERATION_EMPTY",
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;
