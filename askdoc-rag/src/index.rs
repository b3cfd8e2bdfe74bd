//! In-memory vector index over one document's chunks.
//!
//! A [`VectorIndex`] is built once per document and replaced wholesale when
//! the document is re-indexed; it is never mutated in place. Building is
//! the only way to obtain one, so a "not yet built" index cannot be
//! queried by construction.

use serde::{Deserialize, Serialize};

use crate::document::{Chunk, RetrievalResult, ScoredChunk};
use crate::embedding::Embedder;
use crate::error::{PipelineError, Result};

/// How two vectors are compared.
///
/// Cosine is the default and the only metric the pipeline itself uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityMetric {
    /// Normalized dot product; 1.0 for identical directions.
    #[default]
    Cosine,
    /// Raw dot product; useful only for pre-normalized vector spaces.
    DotProduct,
}

impl SimilarityMetric {
    fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::DotProduct => dot(a, b),
        }
    }
}

/// Chunk vectors for a single document plus the nearest-neighbor lookup
/// over them.
///
/// Chunks and vectors are parallel arrays in chunk sequence order; the
/// chunk's `seq` is its id within the index.
#[derive(Debug)]
pub struct VectorIndex {
    document_id: String,
    dimension: usize,
    metric: SimilarityMetric,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Embed every chunk and build the index, using cosine similarity.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::EmptyDocument`] if `chunks` is empty — a vacuous
    ///   index must never be built.
    /// - [`PipelineError::Embedding`] if the embedder fails, or if it
    ///   violates its contract by returning the wrong number of vectors or
    ///   a vector of the wrong dimension.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        Self::build_with_metric(chunks, embedder, SimilarityMetric::default()).await
    }

    /// Like [`build`](VectorIndex::build) with an explicit metric.
    pub async fn build_with_metric(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        metric: SimilarityMetric,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(PipelineError::Embedding {
                provider: embedder.name().to_string(),
                message: format!(
                    "embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    chunks.len()
                ),
                transient: false,
            });
        }

        let dimension = embedder.dimension();
        for (chunk, vector) in chunks.iter().zip(&vectors) {
            if vector.len() != dimension {
                return Err(PipelineError::Embedding {
                    provider: embedder.name().to_string(),
                    message: format!(
                        "expected {dimension}-dimensional vector, got {} for chunk {}",
                        vector.len(),
                        chunk.seq
                    ),
                    transient: false,
                });
            }
        }

        let document_id = chunks[0].document_id.clone();
        Ok(Self { document_id, dimension, metric, chunks, vectors })
    }

    /// Return the `k` chunks most similar to the query vector.
    ///
    /// Results are ordered by descending score; equal scores are broken by
    /// ascending chunk sequence index, so rankings are deterministic. If
    /// `k` exceeds the number of stored chunks, all chunks are returned
    /// ranked — retrieval never comes back empty.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if `k` is zero or the query vector
    /// dimension does not match the index dimension.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(PipelineError::Config("top_k must be greater than zero".to_string()));
        }
        if vector.len() != self.dimension {
            return Err(PipelineError::Config(format!(
                "query vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }

        let mut hits: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .zip(&self.vectors)
            .map(|(chunk, stored)| ScoredChunk {
                chunk: chunk.clone(),
                score: self.metric.score(stored, vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.seq.cmp(&b.chunk.seq))
        });
        hits.truncate(k);

        Ok(RetrievalResult { hits })
    }

    /// Id of the document this index was built from.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Dimension of the stored vectors.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The metric scores are computed under.
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks. Always false for a built index.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The indexed chunks in sequence order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The stored vectors, parallel to [`chunks`](VectorIndex::chunks).
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_direction_is_one() {
        let a = [0.6f32, 0.8];
        let b = [1.2f32, 1.6];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }
}
