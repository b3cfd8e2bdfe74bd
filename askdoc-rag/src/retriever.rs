//! Question retrieval: embed the question, rank the indexed chunks.

use chrono::Utc;
use tracing::debug;

use crate::document::{Query, RetrievalResult};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;

/// Embed `question` and return the `k` most relevant chunks from `index`,
/// along with the [`Query`] record minted for it (the derived vector is
/// born here, so this is where the query is stamped).
///
/// # Errors
///
/// An [`Embedding`](crate::PipelineError::Embedding) failure is propagated
/// unchanged, never turned into an empty result. Invalid `k` or a
/// dimension mismatch surface as [`Config`](crate::PipelineError::Config)
/// from [`VectorIndex::query`].
pub async fn retrieve(
    question: &str,
    index: &VectorIndex,
    embedder: &dyn Embedder,
    k: usize,
) -> Result<(Query, RetrievalResult)> {
    debug!(provider = embedder.name(), k, "embedding question");
    let vector = embedder.embed(question).await?;

    let retrieval = index.query(&vector, k)?;
    debug!(hit_count = retrieval.len(), "retrieval complete");

    let query = Query { text: question.to_string(), vector, asked_at: Utc::now() };
    Ok((query, retrieval))
}
