//! Gemini embedding and answer generation backends.
//!
//! This module is only available when the `gemini` feature is enabled.
//!
//! Both backends call the Google Generative Language REST API directly
//! with `reqwest`, authenticating via the `x-goog-api-key` header. Rate
//! limiting (429) and server errors (5xx) are reported as transient so
//! callers can retry; other failures are permanent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::Embedder;
use crate::error::{PipelineError, Result};
use crate::generation::AnswerGenerator;

/// Base URL of the Generative Language API.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default embedding model.
const DEFAULT_EMBED_MODEL: &str = "text-embedding-004";

/// The dimensionality of `text-embedding-004` vectors.
const DEFAULT_EMBED_DIMENSION: usize = 768;

/// The default generation model.
const DEFAULT_GENERATE_MODEL: &str = "gemini-1.5-flash";

/// The default sampling temperature, kept low so answers stay close to
/// the retrieved context.
const DEFAULT_TEMPERATURE: f32 = 0.1;

const PROVIDER: &str = "Gemini";

const MISSING_KEY: &str = "GOOGLE_API_KEY or GEMINI_API_KEY environment variable not set";

fn api_key_from_env() -> Option<String> {
    std::env::var("GOOGLE_API_KEY").or_else(|_| std::env::var("GEMINI_API_KEY")).ok()
}

/// Whether an HTTP status indicates a retryable backend condition.
fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extract a human-readable detail from an API error body, falling back
/// to the raw body when it is not the documented error envelope.
fn error_detail(body: String) -> String {
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── Embedder ────────────────────────────────────────────────────────

/// An [`Embedder`] backed by the Gemini embedding API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-004`.
/// - `dimension` – optional output truncation (`outputDimensionality`).
/// - `api_key` – from the constructor or the `GOOGLE_API_KEY` /
///   `GEMINI_API_KEY` environment variables.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc_rag::gemini::GeminiEmbedder;
///
/// let embedder = GeminiEmbedder::new("AIza...")?;
/// let vector = embedder.embed("hello world").await?;
/// ```
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimension: usize,
    /// If set, sent as `outputDimensionality` for truncated embeddings.
    request_dimension: Option<usize>,
}

impl GeminiEmbedder {
    /// Create a new embedder with the given API key.
    ///
    /// Uses the default model (`text-embedding-004`, 768 dimensions).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(PipelineError::Embedding {
                provider: PROVIDER.into(),
                message: "API key must not be empty".into(),
                transient: false,
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBED_MODEL.into(),
            dimension: DEFAULT_EMBED_DIMENSION,
            request_dimension: None,
        })
    }

    /// Create a new embedder from the `GOOGLE_API_KEY` or `GEMINI_API_KEY`
    /// environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = api_key_from_env().ok_or_else(|| PipelineError::Embedding {
            provider: PROVIDER.into(),
            message: MISSING_KEY.into(),
            transient: false,
        })?;
        Self::new(api_key)
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Truncate returned embeddings to `dims` values.
    ///
    /// This also updates the value reported by
    /// [`dimension()`](Embedder::dimension).
    pub fn with_dimension(mut self, dims: usize) -> Self {
        self.dimension = dims;
        self.request_dimension = Some(dims);
        self
    }

    fn qualified_model(&self) -> String {
        format!("models/{}", self.model)
    }

    fn embedding_error(&self, message: String, transient: bool) -> PipelineError {
        PipelineError::Embedding { provider: PROVIDER.into(), message, transient }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let model = self.qualified_model();
        let request_body = EmbedContentRequest {
            model: &model,
            content: Content { parts: vec![Part { text }] },
            output_dimensionality: self.request_dimension,
        };
        let url = format!("{GEMINI_API_BASE}/models/{}:embedContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                self.embedding_error(format!("request failed: {e}"), true)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = PROVIDER, %status, "API error");
            return Err(self.embedding_error(
                format!("API returned {status}: {detail}"),
                is_transient_status(status),
            ));
        }

        let parsed: EmbedContentResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            self.embedding_error(format!("failed to parse response: {e}"), false)
        })?;

        Ok(parsed.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let model = self.qualified_model();
        let request_body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &model,
                    content: Content { parts: vec![Part { text }] },
                    output_dimensionality: self.request_dimension,
                })
                .collect(),
        };
        let url = format!("{GEMINI_API_BASE}/models/{}:batchEmbedContents", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                self.embedding_error(format!("request failed: {e}"), true)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = PROVIDER, %status, "API error");
            return Err(self.embedding_error(
                format!("API returned {status}: {detail}"),
                is_transient_status(status),
            ));
        }

        let parsed: BatchEmbedResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            self.embedding_error(format!("failed to parse response: {e}"), false)
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(self.embedding_error(
                format!(
                    "API returned {} embeddings for {} inputs",
                    parsed.embeddings.len(),
                    texts.len()
                ),
                false,
            ));
        }

        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ── AnswerGenerator ─────────────────────────────────────────────────

/// An [`AnswerGenerator`] backed by the Gemini `generateContent` API.
///
/// # Configuration
///
/// - `model` – defaults to `gemini-1.5-flash`.
/// - `temperature` – defaults to 0.1.
/// - `api_key` – from the constructor or the `GOOGLE_API_KEY` /
///   `GEMINI_API_KEY` environment variables.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiGenerator {
    /// Create a new generator with the given API key.
    ///
    /// Uses the default model (`gemini-1.5-flash`) and temperature (0.1).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(PipelineError::Generation {
                provider: PROVIDER.into(),
                message: "API key must not be empty".into(),
                transient: false,
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_GENERATE_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Create a new generator from the `GOOGLE_API_KEY` or `GEMINI_API_KEY`
    /// environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = api_key_from_env().ok_or_else(|| PipelineError::Generation {
            provider: PROVIDER.into(),
            message: MISSING_KEY.into(),
            transient: false,
        })?;
        Self::new(api_key)
    }

    /// Set the generation model name (e.g. `gemini-1.5-pro`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn generation_error(&self, message: String, transient: bool) -> PipelineError {
        PipelineError::Generation { provider: PROVIDER.into(), message, transient }
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            provider = PROVIDER,
            prompt_len = prompt.len(),
            model = %self.model,
            "generating answer"
        );

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent { role: "user", parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { temperature: self.temperature },
        };
        let url = format!("{GEMINI_API_BASE}/models/{}:generateContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                self.generation_error(format!("request failed: {e}"), true)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = PROVIDER, %status, "API error");
            return Err(self.generation_error(
                format!("API returned {status}: {detail}"),
                is_transient_status(status),
            ));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            self.generation_error(format!("failed to parse response: {e}"), false)
        })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| self.generation_error("API returned no candidates".into(), false))?;

        let text: String =
            candidate.content.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join("");
        if text.is_empty() {
            return Err(self.generation_error("API returned an empty answer".into(), false));
        }

        Ok(text)
    }
}
