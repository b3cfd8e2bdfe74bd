//! Configuration for the question-answering pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::prompt::PromptTemplate;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Default upper bound on a single embedding interaction.
pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound on a single generation call.
pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration parameters for the pipeline.
///
/// Every rebuild reads the controller's latest configuration: chunking
/// parameters apply at the next ingest, `top_k`, the prompt template, and
/// the timeouts at the next question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Maximum chunk size in bytes.
    pub chunk_size: usize,
    /// Number of overlapping bytes between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top-ranked chunks retrieved per question.
    pub top_k: usize,
    /// Template used to assemble the grounded prompt.
    pub prompt: PromptTemplate,
    /// Upper bound on one embedding interaction (a query embed or the whole
    /// batch embed of a build).
    pub embed_timeout: Duration,
    /// Upper bound on one generation call.
    pub generate_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 100,
            top_k: DEFAULT_TOP_K,
            prompt: PromptTemplate::default(),
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// The pipeline calls this again at the start of every ingest and every
    /// question, because the fields are public and a hand-built config may
    /// never have gone through the builder.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - either timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PipelineError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(PipelineError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(PipelineError::Config("top_k must be greater than zero".to_string()));
        }
        if self.embed_timeout.is_zero() || self.generate_timeout.is_zero() {
            return Err(PipelineError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the maximum chunk size in bytes.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in bytes.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top-ranked chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the prompt template.
    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.config.prompt = prompt;
        self
    }

    /// Set the upper bound on one embedding interaction.
    pub fn embed_timeout(mut self, timeout: Duration) -> Self {
        self.config.embed_timeout = timeout;
        self
    }

    /// Set the upper bound on one generation call.
    pub fn generate_timeout(mut self, timeout: Duration) -> Self {
        self.config.generate_timeout = timeout;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] as described by
    /// [`PipelineConfig::validate`].
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
