//! # Document Q&A Gemini Demo
//!
//! The same pipeline as `qa_basic`, backed by real Gemini embeddings
//! (`text-embedding-004`) and answer generation (`gemini-1.5-flash`).
//!
//! Requires: `GOOGLE_API_KEY` (or `GEMINI_API_KEY`) environment variable.
//!
//! Run: `cargo run -p askdoc-demos --example qa_gemini --features gemini`

use std::sync::Arc;

use askdoc_rag::gemini::{GeminiEmbedder, GeminiGenerator};
use askdoc_rag::{PipelineConfig, PipelineController};

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

    // Load .env if present (for GOOGLE_API_KEY).
    dotenvy::dotenv().ok();

    // -- 1. Build Gemini-backed capabilities --------------------------------
    let embedder = Arc::new(GeminiEmbedder::from_env().expect(
        "GOOGLE_API_KEY or GEMINI_API_KEY must be set.\n\
         Get a key at https://aistudio.google.com/apikey",
    ));
    let generator = Arc::new(GeminiGenerator::from_env()?);

    // -- 2. Assemble the pipeline -------------------------------------------
    let config = PipelineConfig::builder().chunk_size(512).chunk_overlap(100).top_k(4).build()?;
    let controller = Arc::new(
        PipelineController::builder()
            .config(config)
            .embedder(embedder)
            .generator(generator)
            .build()?,
    );

    // -- 3. Ingest and ask ----------------------------------------------------
    println!("Ingesting document ({} bytes)...", DOCUMENT.len());
    let summary = controller.ingest(DOCUMENT).await?;
    println!("  indexed {} chunk(s)", summary.chunk_count);

    let questions = [
        "Who founded Wuranda Corporation, and what is their background?",
        "How many people does the company employ?",
        "What is the capital of France?",
    ];

    for question in &questions {
        println!("\nQ: {question}");
        match controller.ask(question).await {
            Ok(answer) => println!("A: {}", answer.text.trim()),
            // Transient failures (rate limits, timeouts) are worth retrying;
            // surface the distinction instead of bailing out.
            Err(e) if e.is_transient() => println!("   transient failure, retry later: {e}"),
            Err(e) => return Err(e.into()),
        }
    }

    println!("\nDone.");
    Ok(())
}
