//! Grounded prompt assembly.
//!
//! The prompt places retrieved chunks (in retrieval order, each attributed
//! to its chunk sequence id) between fixed delimiters, followed by the
//! literal question. The leading instruction pins the generator to the
//! supplied context and tells it to say when the context is insufficient.

use serde::{Deserialize, Serialize};

use crate::document::RetrievalResult;

/// The default grounding instruction.
pub const DEFAULT_INSTRUCTION: &str = "Answer the question using only the context information \
     below, not prior knowledge. If the context does not contain the information needed to \
     answer, say that the document does not answer the question.";

/// A deterministic template for assembling grounded prompts.
///
/// Rendering is a pure function of the instruction, the retrieval, and the
/// question: identical inputs produce byte-identical prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptTemplate {
    /// Instruction prepended to every prompt.
    pub instruction: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { instruction: DEFAULT_INSTRUCTION.to_string() }
    }
}

impl PromptTemplate {
    /// Create a template with a custom grounding instruction.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self { instruction: instruction.into() }
    }

    /// Assemble the prompt for a question over the retrieved chunks.
    pub fn render(&self, retrieval: &RetrievalResult, question: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str(&self.instruction);
        prompt.push_str("\n\nContext information is below.\n---------------------\n");
        for hit in retrieval.iter() {
            prompt.push_str(&format!("[chunk {}] {}\n", hit.chunk.seq, hit.chunk.text));
        }
        prompt.push_str("---------------------\n");
        prompt.push_str(&format!("Question: {question}\nAnswer:"));
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Chunk, ScoredChunk};

    fn hit(seq: usize, text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                document_id: "doc".into(),
                seq,
                start: 0,
                end: text.len(),
                text: text.into(),
            },
            score,
        }
    }

    #[test]
    fn render_contains_instruction_chunks_and_question() {
        let retrieval = RetrievalResult { hits: vec![hit(2, "beta", 0.9), hit(0, "alpha", 0.5)] };
        let prompt = PromptTemplate::default().render(&retrieval, "what is alpha?");

        assert!(prompt.starts_with(DEFAULT_INSTRUCTION));
        assert!(prompt.contains("[chunk 2] beta"));
        assert!(prompt.contains("[chunk 0] alpha"));
        assert!(prompt.contains("Question: what is alpha?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn render_keeps_retrieval_order() {
        let retrieval = RetrievalResult { hits: vec![hit(3, "third", 0.9), hit(1, "first", 0.8)] };
        let prompt = PromptTemplate::default().render(&retrieval, "q");

        let third = prompt.find("[chunk 3]").unwrap();
        let first = prompt.find("[chunk 1]").unwrap();
        assert!(third < first, "chunks must appear in retrieval order");
    }

    #[test]
    fn render_is_deterministic() {
        let retrieval = RetrievalResult { hits: vec![hit(0, "same", 1.0)] };
        let template = PromptTemplate::default();
        assert_eq!(template.render(&retrieval, "q"), template.render(&retrieval, "q"));
    }
}
