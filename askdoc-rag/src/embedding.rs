//! Embedder capability trait.

use async_trait::async_trait;

use crate::error::Result;

/// A capability that maps text to a fixed-length embedding vector.
///
/// Implementations wrap specific backends (Gemini, a local model, a test
/// stub) behind a unified async interface. Embedding must be deterministic
/// for identical input: the same text always maps to the same vector. The
/// default [`embed_batch`](Embedder::embed_batch) calls
/// [`embed`](Embedder::embed) sequentially; backends with a native batch
/// endpoint should override it.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc_rag::Embedder;
///
/// let vector = embedder.embed("hello world").await?;
/// assert_eq!(vector.len(), embedder.dimension());
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Short backend name used in errors and logs (e.g. `"Gemini"`).
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Embedding`](crate::PipelineError::Embedding)
    /// on backend failure.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in input order.
    ///
    /// The default implementation calls [`embed`](Embedder::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput; the result
    /// order must still match the input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimension of every vector this embedder produces.
    fn dimension(&self) -> usize;
}
