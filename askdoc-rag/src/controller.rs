//! Pipeline orchestrator and index lifecycle owner.
//!
//! The [`PipelineController`] coordinates ingestion (chunk → embed → index)
//! and questioning (embed → retrieve → prompt → generate) over one active
//! document index. It is an explicit, injectable instance — share it as
//! `Arc<PipelineController>` — never ambient global state.
//!
//! # State machine
//!
//! `Empty → Indexed`, re-entering `Indexed` on every successful re-ingest.
//! The current index lives behind an `RwLock<Option<Arc<…>>>`: questions
//! clone the `Arc` under a read lock and run against that snapshot, and a
//! rebuild publishes its fully built replacement with one write — so a
//! concurrent question sees the whole old index or the whole new one,
//! never a mixture, and a failed build leaves the previous state intact.
//! Only one build may run at a time; a second concurrent ingest is
//! rejected with [`PipelineError::BuildInProgress`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askdoc_rag::{PipelineConfig, PipelineController};
//!
//! let controller = Arc::new(
//!     PipelineController::builder()
//!         .config(PipelineConfig::default())
//!         .embedder(Arc::new(my_embedder))
//!         .generator(Arc::new(my_generator))
//!         .build()?,
//! );
//!
//! controller.ingest(document_text).await?;
//! let answer = controller.ask("What does the document say about X?").await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{error, info};

use crate::chunking::SentenceChunker;
use crate::config::PipelineConfig;
use crate::document::{Answer, Document, IngestSummary};
use crate::embedding::Embedder;
use crate::error::{PipelineError, Result};
use crate::generation::AnswerGenerator;
use crate::index::VectorIndex;
use crate::retriever::retrieve;

/// Lifecycle state of the controller's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// No document has been successfully indexed yet.
    Empty,
    /// A document is indexed and can be questioned.
    Indexed,
}

/// A fully built index together with the document it was built from.
/// Immutable once published; replaced wholesale on re-ingest.
struct IndexedDocument {
    document: Document,
    index: VectorIndex,
}

/// The question-answering pipeline orchestrator.
///
/// Owns the lifecycle of "the current document's index" and composes the
/// two injected capabilities. Construct one via
/// [`PipelineController::builder()`].
pub struct PipelineController {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    config: RwLock<PipelineConfig>,
    current: RwLock<Option<Arc<IndexedDocument>>>,
    build_permit: Mutex<()>,
}

impl std::fmt::Debug for PipelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineController")
            .field("embedder", &self.embedder.name())
            .field("generator", &self.generator.name())
            .finish_non_exhaustive()
    }
}

impl PipelineController {
    /// Create a new [`PipelineControllerBuilder`].
    pub fn builder() -> PipelineControllerBuilder {
        PipelineControllerBuilder::default()
    }

    /// Ingest raw document text: mint a [`Document`], chunk it, embed the
    /// chunks, and publish the index.
    ///
    /// Uses the controller's latest configuration. On any failure the
    /// previous state is preserved — the old index, if any, keeps serving
    /// questions, and no half-built index is ever observable.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::BuildInProgress`] if another ingest is running.
    /// - [`PipelineError::Config`] for invalid chunking parameters,
    ///   rejected before any work.
    /// - [`PipelineError::EmptyDocument`] if the text has no content.
    /// - [`PipelineError::Embedding`] if the embedder fails or times out.
    pub async fn ingest(&self, text: impl Into<String>) -> Result<IngestSummary> {
        self.ingest_document(Document::new(text)).await
    }

    /// Ingest a caller-minted [`Document`], preserving its id and source
    /// reference. Same behavior as [`ingest`](PipelineController::ingest).
    pub async fn ingest_document(&self, document: Document) -> Result<IngestSummary> {
        let _permit =
            self.build_permit.try_lock().map_err(|_| PipelineError::BuildInProgress)?;

        let config = self.config.read().await.clone();
        config.validate()?;

        if document.text.trim().is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        let chunker = SentenceChunker::new(config.chunk_size, config.chunk_overlap)?;
        let chunks = chunker.chunk(&document);

        let index = timeout(
            config.embed_timeout,
            VectorIndex::build(chunks, self.embedder.as_ref()),
        )
        .await
        .map_err(|_| {
            error!(document.id = %document.id, "embedding timed out during ingest");
            PipelineError::Embedding {
                provider: self.embedder.name().to_string(),
                message: format!("timed out after {:?}", config.embed_timeout),
                transient: true,
            }
        })?
        .inspect_err(|e| error!(document.id = %document.id, error = %e, "ingest failed"))?;

        let document_id = document.id.clone();
        let chunk_count = index.len();
        let dimension = index.dimension();

        // Build-then-swap: the replacement is complete before the old index
        // is discarded, so an in-flight question never sees a gap.
        let replaced = {
            let mut current = self.current.write().await;
            current.replace(Arc::new(IndexedDocument { document, index })).is_some()
        };

        info!(document.id = %document_id, chunk_count, replaced, "indexed document");
        Ok(IngestSummary { document_id, chunk_count, dimension, replaced })
    }

    /// Answer a question from the currently indexed document.
    ///
    /// Retrieves the top-k chunks, assembles the grounded prompt, and hands
    /// it to the generator. The answer either comes back fully grounded or
    /// the call fails explicitly — a backend failure is never downgraded to
    /// a degraded answer, and a failed or timed-out generation leaves the
    /// index untouched and eligible for retry.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotIndexed`] if no document has been indexed.
    /// - [`PipelineError::Embedding`] /
    ///   [`PipelineError::Generation`] on backend failure or timeout,
    ///   propagated unchanged (`transient` marks retryable failures).
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let config = self.config.read().await.clone();
        config.validate()?;

        // Snapshot the published index; a rebuild swapping mid-question
        // does not affect this call.
        let current = self.current.read().await.clone().ok_or(PipelineError::NotIndexed)?;

        let (query, retrieval) = timeout(
            config.embed_timeout,
            retrieve(question, &current.index, self.embedder.as_ref(), config.top_k),
        )
        .await
        .map_err(|_| {
            error!("question embedding timed out");
            PipelineError::Embedding {
                provider: self.embedder.name().to_string(),
                message: format!("timed out after {:?}", config.embed_timeout),
                transient: true,
            }
        })?
        .inspect_err(|e| error!(error = %e, "retrieval failed"))?;

        let prompt = config.prompt.render(&retrieval, question);

        let text = timeout(config.generate_timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| {
                error!("generation timed out");
                PipelineError::Generation {
                    provider: self.generator.name().to_string(),
                    message: format!("timed out after {:?}", config.generate_timeout),
                    transient: true,
                }
            })?
            .inspect_err(|e| error!(error = %e, "generation failed"))?;

        info!(
            document.id = %current.index.document_id(),
            hit_count = retrieval.len(),
            "answered question"
        );
        Ok(Answer { text, query, retrieval })
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> PipelineState {
        if self.current.read().await.is_some() {
            PipelineState::Indexed
        } else {
            PipelineState::Empty
        }
    }

    /// The currently indexed document, if any.
    pub async fn document(&self) -> Option<Document> {
        self.current.read().await.as_ref().map(|c| c.document.clone())
    }

    /// Drop the current index, returning to `Empty`.
    pub async fn clear(&self) {
        let dropped = self.current.write().await.take();
        if let Some(c) = dropped {
            info!(document.id = %c.document.id, "cleared index");
        }
    }

    /// Snapshot of the controller's configuration.
    pub async fn config(&self) -> PipelineConfig {
        self.config.read().await.clone()
    }

    /// Replace the configuration. Takes effect for subsequent operations:
    /// the next ingest rebuilds with the new chunking parameters, the next
    /// question uses the new `top_k`, prompt, and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the new configuration is
    /// inconsistent; the previous configuration is kept.
    pub async fn update_config(&self, config: PipelineConfig) -> Result<()> {
        config.validate()?;
        *self.config.write().await = config;
        Ok(())
    }
}

/// Builder for constructing a [`PipelineController`].
///
/// The embedder and generator are required; the configuration falls back
/// to [`PipelineConfig::default()`] when not set.
#[derive(Default)]
pub struct PipelineControllerBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl PipelineControllerBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding capability.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the answer generation capability.
    pub fn generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`PipelineController`], validating the configuration and
    /// that both capabilities are present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if a capability is missing or the
    /// configuration is inconsistent.
    pub fn build(self) -> Result<PipelineController> {
        let embedder = self
            .embedder
            .ok_or_else(|| PipelineError::Config("embedder is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| PipelineError::Config("generator is required".to_string()))?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(PipelineController {
            embedder,
            generator,
            config: RwLock::new(config),
            current: RwLock::new(None),
            build_permit: Mutex::new(()),
        })
    }
}
