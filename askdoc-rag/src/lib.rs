//! # askdoc-rag
//!
//! Retrieval-augmented question answering over a single document.
//!
//! ## Overview
//!
//! This crate turns one document at a time into a queryable knowledge
//! source: text is split into overlapping chunks with byte-span
//! provenance, embedded, and held in an in-memory vector index; questions
//! are answered by retrieving the most similar chunks and prompting a
//! generation backend with that context and nothing else.
//!
//! The main pieces:
//!
//! - [`PipelineController`] - orchestrator owning the index lifecycle
//! - [`SentenceChunker`] - boundary-aware text splitter
//! - [`VectorIndex`] - immutable in-memory similarity index
//! - [`Embedder`] / [`AnswerGenerator`] - injectable backend capabilities
//! - `GeminiEmbedder` / `GeminiGenerator` - Gemini-backed implementations
//!   (behind the `gemini` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askdoc_rag::gemini::{GeminiEmbedder, GeminiGenerator};
//! use askdoc_rag::PipelineController;
//!
//! let controller = PipelineController::builder()
//!     .embedder(Arc::new(GeminiEmbedder::from_env()?))
//!     .generator(Arc::new(GeminiGenerator::from_env()?))
//!     .build()?;
//!
//! let summary = controller.ingest(document_text).await?;
//! println!("indexed {} chunks", summary.chunk_count);
//!
//! let answer = controller.ask("Who founded the company?").await?;
//! println!("{}", answer.text);
//! ```
//!
//! ## Guarantees
//!
//! - Chunking is deterministic and never splits a UTF-8 character;
//!   every chunk carries its exact byte span in the source text.
//! - Retrieval ranks by similarity, descending, ties broken by chunk
//!   order in the document; results never exceed `top_k`.
//! - Re-ingesting replaces the index atomically: concurrent questions
//!   see the whole old index or the whole new one, and a failed rebuild
//!   leaves the previous index serving.
//! - Backend failures surface as explicit [`PipelineError`] values with
//!   a transient/permanent distinction, never as degraded answers.

pub mod chunking;
pub mod config;
pub mod controller;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod generation;
pub mod index;
pub mod prompt;
pub mod retriever;

pub use chunking::SentenceChunker;
pub use config::{DEFAULT_TOP_K, PipelineConfig, PipelineConfigBuilder};
pub use controller::{PipelineController, PipelineControllerBuilder, PipelineState};
pub use document::{Answer, Chunk, Document, IngestSummary, Query, RetrievalResult, ScoredChunk};
pub use embedding::Embedder;
pub use error::{PipelineError, Result};
#[cfg(feature = "gemini")]
pub use gemini::{GeminiEmbedder, GeminiGenerator};
pub use generation::AnswerGenerator;
pub use index::{SimilarityMetric, VectorIndex};
pub use prompt::{DEFAULT_INSTRUCTION, PromptTemplate};
pub use retriever::retrieve;
