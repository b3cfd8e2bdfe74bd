//! # Document Q&A Basic Demo
//!
//! Walks the whole pipeline offline: ingest a document, watch it get
//! chunked and indexed, then ask questions against it.
//!
//! Uses a deterministic bag-of-words embedder and an extractive stub
//! generator so it runs with **zero API keys**.
//!
//! Run: `cargo run -p askdoc-demos --example qa_basic`

use std::sync::Arc;

use askdoc_rag::{AnswerGenerator, Embedder, PipelineConfig, PipelineController, Result};

// ---------------------------------------------------------------------------
// KeywordEmbedder — deterministic bag-of-words embeddings for keyless demos
// ---------------------------------------------------------------------------

struct KeywordEmbedder {
    dimension: usize,
}

impl KeywordEmbedder {
    fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait::async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Hash each word into a bucket. Crude, but texts sharing words end
        // up with similar directions, which is all a demo needs.
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let token = token.to_lowercase();
            let hash =
                token.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            vector[(hash % self.dimension as u64) as usize] += 1.0;
        }
        // L2-normalise so cosine similarity is just the dot product.
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

// ---------------------------------------------------------------------------
// ExtractiveGenerator — quotes the best retrieved chunk instead of an LLM
// ---------------------------------------------------------------------------

struct ExtractiveGenerator;

#[async_trait::async_trait]
impl AnswerGenerator for ExtractiveGenerator {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        // The grounded prompt lists context lines between dashed rules;
        // answer by quoting the top-ranked one.
        let best = prompt
            .lines()
            .find(|line| line.starts_with("[chunk "))
            .and_then(|line| line.split_once("] ").map(|(_, text)| text))
            .unwrap_or("(no context retrieved)");
        Ok(format!("According to the document: {best}"))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

const DOCUMENT: &str = "Wuranda Corporation was founded in 2041 by Mara Kelso, a marine \
engineer from Port Ellison. The company designs and manufactures deep-sea sensor arrays for \
research stations. Its first product, the Halyard probe, shipped after nine years of \
prototyping in a converted dockside warehouse.\n\nThe company remained privately held through \
its first decade. Revenue doubled in 2055 when the Halyard line was adopted by three polar \
observatories. Wuranda now employs just over four hundred people across two campuses, and \
the original warehouse still houses the calibration lab.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // -- 1. Configure the pipeline ----------------------------------------
    // chunk_size=200 keeps chunks small for this demo; overlap=40 ensures
    // context is shared between adjacent chunks; top_k=3 grounds each
    // answer on the three most relevant chunks.
    let config = PipelineConfig::builder().chunk_size(200).chunk_overlap(40).top_k(3).build()?;

    // -- 2. Build the controller with offline backends --------------------
    let controller = Arc::new(
        PipelineController::builder()
            .config(config)
            .embedder(Arc::new(KeywordEmbedder::new(64)))
            .generator(Arc::new(ExtractiveGenerator))
            .build()?,
    );

    // -- 3. Ingest the document --------------------------------------------
    println!("Ingesting document ({} bytes)...", DOCUMENT.len());
    let summary = controller.ingest(DOCUMENT).await?;
    println!(
        "  indexed {} chunk(s) of dimension {} (document {})",
        summary.chunk_count, summary.dimension, summary.document_id
    );

    // -- 4. Ask questions ---------------------------------------------------
    let questions = [
        "Who founded Wuranda Corporation?",
        "What was the company's first product?",
        "When did revenue double?",
    ];

    for question in &questions {
        println!("\nQ: {question}");
        let answer = controller.ask(question).await?;
        println!("A: {}", answer.text);

        for (i, hit) in answer.retrieval.iter().enumerate() {
            let preview: String = hit.chunk.text.chars().take(60).collect();
            println!(
                "   {}. [score={:.4}] chunk {} @ {}..{} | {preview}",
                i + 1,
                hit.score,
                hit.chunk.seq,
                hit.chunk.start,
                hit.chunk.end,
            );
        }
    }

    println!("\nDone.");
    Ok(())
}
