//! Error types for the `askdoc-rag` crate.

use thiserror::Error;

/// Errors that can occur in the question-answering pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configuration validation error. Rejected before any work is done.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The document has no chunkable content; nothing was indexed.
    #[error("Document has no chunkable content")]
    EmptyDocument,

    /// A question was asked before any document was successfully indexed.
    #[error("No document has been indexed")]
    NotIndexed,

    /// An index build is already running; the request was rejected.
    #[error("An index build is already in progress")]
    BuildInProgress,

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether the failure is retryable (rate limit, outage, timeout).
        transient: bool,
    },

    /// An error occurred during answer generation.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether the failure is retryable (rate limit, outage, timeout).
        transient: bool,
    },
}

impl PipelineError {
    /// Whether retrying the same operation may succeed.
    ///
    /// True only for backend failures that signalled a retryable condition
    /// (rate limiting, server-side outage, timeout). Configuration and
    /// state-machine errors are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Embedding { transient, .. } | Self::Generation { transient, .. } => *transient,
            _ => false,
        }
    }
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
