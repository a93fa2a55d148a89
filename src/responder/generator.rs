//! Text-generation collaborator
//!
//! The core never builds prompts or talks to a model service. Callers
//! construct one generator at startup and hand it to whatever needs it.
//! Timeouts and retries are the generator's business.

use super::errors::GenerationResult;

pub trait TextGenerator: Send + Sync {
    /// Produce plain text for `prompt`.
    fn generate(&self, prompt: &str) -> GenerationResult<String>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> GenerationResult<String> + Send + Sync,
{
    fn generate(&self, prompt: &str) -> GenerationResult<String> {
        self(prompt)
    }
}

/// Returns the same text for every prompt.
#[derive(Debug, Clone)]
pub struct FixedReply(pub String);

impl TextGenerator for FixedReply {
    fn generate(&self, _prompt: &str) -> GenerationResult<String> {
        Ok(self.0.clone())
    }
}
