//! Data types for documents, chunks, queries, and answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source document containing the raw text a user uploaded.
///
/// Immutable once ingested. Re-ingesting produces a new `Document` with a
/// fresh id; the pipeline never mutates an existing one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The full text content of the document.
    pub text: String,
    /// Optional reference to where the text came from (filename, URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Document {
    /// Create a document with a freshly minted UUID v4 identifier.
    pub fn new(text: impl Into<String>) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), text: text.into(), source: None }
    }

    /// Attach a source reference (filename, URL) to the document.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A contiguous span of a [`Document`]'s text, the unit of retrieval.
///
/// `start`/`end` are byte offsets into the owning document, always on
/// `char` boundaries, with `text == document.text[start..end]`. Across a
/// chunking run, spans start at 0, strictly increase, abut or overlap by at
/// most the configured overlap, and the last span ends at the document
/// length — so stitching the non-overlapping regions back together
/// reproduces the document exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The id of the owning [`Document`].
    pub document_id: String,
    /// Zero-based position of this chunk in the chunking sequence.
    pub seq: usize,
    /// Byte offset of the span start in the document text.
    pub start: usize,
    /// Byte offset one past the span end in the document text.
    pub end: usize,
    /// The text covered by the span.
    pub text: String,
}

/// A question at the moment it was asked, with its derived embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// The raw question text.
    pub text: String,
    /// The embedding vector derived from the question text.
    pub vector: Vec<f32>,
    /// When the question was asked.
    pub asked_at: DateTime<Utc>,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query vector (higher is more relevant).
    pub score: f32,
}

/// The ranked outcome of a retrieval: at most `top_k` chunks, ordered by
/// descending score, ties broken by ascending chunk sequence index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The ranked hits, best first.
    pub hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    /// Number of retrieved chunks.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether nothing was retrieved.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterate over the hits in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredChunk> {
        self.hits.iter()
    }
}

/// A generated answer together with the query and retrieval that grounded it.
///
/// Ephemeral: created per request and not persisted beyond the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// The question this answer responds to.
    pub query: Query,
    /// The retrieved chunks the prompt was grounded on.
    pub retrieval: RetrievalResult,
}

/// Receipt for a successful ingest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestSummary {
    /// Id of the document that is now indexed.
    pub document_id: String,
    /// Number of chunks the document was split into.
    pub chunk_count: usize,
    /// Dimension of the stored embedding vectors.
    pub dimension: usize,
    /// Whether a previously indexed document was replaced.
    pub replaced: bool,
}
