//! Answer generator capability trait.

use async_trait::async_trait;

use crate::error::Result;

/// A capability that turns an assembled prompt into generated text.
///
/// The pipeline hands implementations a fully grounded prompt and uses the
/// returned text verbatim as the answer. Token-by-token streaming is
/// deliberately not part of this contract.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Short backend name used in errors and logs (e.g. `"Gemini"`).
    fn name(&self) -> &str;

    /// Generate a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Generation`](crate::PipelineError::Generation)
    /// on backend failure, with the `transient` flag set when the backend
    /// signalled a retryable condition such as rate limiting.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
