//! Deterministic stub backends shared by the integration tests.
//!
//! No test in this suite talks to a real embedding or generation service;
//! these stubs give the pipeline predictable backends whose failure modes
//! and timing the tests control directly.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use askdoc_rag::embedding::Embedder;
use askdoc_rag::error::{PipelineError, Result};
use askdoc_rag::generation::AnswerGenerator;
use async_trait::async_trait;
use tokio::sync::Notify;

/// Deterministic content-hash embeddings: the same text always maps to the
/// same L2-normalized vector, distinct texts almost always differ.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut vector = vec![0.0f32; self.dimension];
        for (i, v) in vector.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Bag-of-words embeddings: tokens hash into buckets, so texts sharing
/// words score higher under cosine than unrelated texts. Crude, but it
/// gives retrieval tests real similarity structure without a model.
pub struct KeywordEmbedder {
    dimension: usize,
}

impl KeywordEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let token = token.to_lowercase();
            let hash =
                token.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            vector[(hash % self.dimension as u64) as usize] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// An embedder that can be switched into a failing state at runtime.
pub struct FlakyEmbedder {
    inner: HashEmbedder,
    failing: AtomicBool,
}

impl FlakyEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { inner: HashEmbedder::new(dimension), failing: AtomicBool::new(false) }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PipelineError::Embedding {
                provider: "flaky".into(),
                message: "backend unavailable".into(),
                transient: false,
            });
        }
        self.inner.embed(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// An embedder whose batch calls block on a gate once engaged, letting a
/// test hold an index build open while it observes the pipeline from the
/// outside. Single-text embeds always pass through.
pub struct GatedEmbedder {
    inner: HashEmbedder,
    engaged: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl GatedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: HashEmbedder::new(dimension),
            engaged: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Make the next batch embed block until [`release`](Self::release).
    pub fn engage(&self) {
        self.engaged.store(true, Ordering::SeqCst);
    }

    /// Wait until a batch embed has entered the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the blocked batch embed proceed.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl Embedder for GatedEmbedder {
    fn name(&self) -> &str {
        "gated"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if self.engaged.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.embed_batch(texts).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// An embedder that sleeps before answering, for timeout tests under a
/// paused clock.
pub struct SlowEmbedder {
    inner: HashEmbedder,
    delay: Duration,
}

impl SlowEmbedder {
    pub fn new(dimension: usize, delay: Duration) -> Self {
        Self { inner: HashEmbedder::new(dimension), delay }
    }
}

#[async_trait]
impl Embedder for SlowEmbedder {
    fn name(&self) -> &str {
        "slow"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        tokio::time::sleep(self.delay).await;
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        tokio::time::sleep(self.delay).await;
        self.inner.embed_batch(texts).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// A generator that returns the prompt verbatim, so tests can assert on
/// exactly what the pipeline asked for.
pub struct EchoGenerator;

#[async_trait]
impl AnswerGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}

/// A generator that can be switched into a failing state at runtime.
pub struct FlakyGenerator {
    failing: AtomicBool,
    transient: bool,
}

impl FlakyGenerator {
    pub fn new(transient: bool) -> Self {
        Self { failing: AtomicBool::new(false), transient }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnswerGenerator for FlakyGenerator {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PipelineError::Generation {
                provider: "flaky".into(),
                message: "backend unavailable".into(),
                transient: self.transient,
            });
        }
        Ok("the answer".to_string())
    }
}

/// A generator that sleeps before answering, for timeout tests under a
/// paused clock.
pub struct SlowGenerator {
    delay: Duration,
}

impl SlowGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl AnswerGenerator for SlowGenerator {
    fn name(&self) -> &str {
        "slow"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok("slow answer".to_string())
    }
}
