//! Document chunking.
//!
//! [`SentenceChunker`] splits a document into overlapping chunks that carry
//! byte-span provenance: each chunk records exactly where in the document
//! its text lives. Splitting prefers a paragraph break inside the window,
//! then the latest sentence break, and hard-splits at `chunk_size` only
//! when the window contains neither.

use crate::document::{Chunk, Document};
use crate::error::{PipelineError, Result};

/// Sentence-ending sequences, searched back-to-front within a window.
/// The separator stays attached to the chunk that ends with it.
const SENTENCE_BREAKS: [&str; 6] = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

/// Paragraph separator, preferred over any sentence break.
const PARAGRAPH_BREAK: &str = "\n\n";

/// Splits text into chunks bounded by `chunk_size` bytes, preferring
/// natural boundaries, with `overlap` bytes duplicated between consecutive
/// chunks so context spanning a boundary is retrievable from either side.
///
/// Splitting is deterministic: identical text and parameters always yield
/// identical spans. All span offsets land on `char` boundaries, so a chunk
/// never cuts a UTF-8 scalar value in half; a multibyte character sitting
/// exactly on the size limit rounds the window rather than being split.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc_rag::SentenceChunker;
///
/// let chunker = SentenceChunker::new(512, 100)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    overlap: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PipelineError::Config("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(PipelineError::Config(format!(
                "chunk_overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text; a document
    /// shorter than `chunk_size` yields exactly one chunk spanning it all.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.text;
        if text.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let end = self.window_end(text, start);

            chunks.push(Chunk {
                document_id: document.id.clone(),
                seq: chunks.len(),
                start,
                end,
                text: text[start..end].to_string(),
            });

            if end == text.len() {
                break;
            }

            // Back up by the overlap so trailing context is repeated at the
            // head of the next chunk. If the multibyte snap would stall the
            // walk, skip the overlap for this step instead.
            let mut next = floor_char_boundary(text, end.saturating_sub(self.overlap));
            if next <= start {
                next = end;
            }
            start = next;
        }

        chunks
    }

    /// Pick the end of the chunk starting at `start`: the remaining tail if
    /// it fits, else the best natural boundary inside the window, else the
    /// hard size limit.
    fn window_end(&self, text: &str, start: usize) -> usize {
        if start + self.chunk_size >= text.len() {
            return text.len();
        }

        let mut hard_end = floor_char_boundary(text, start + self.chunk_size);
        if hard_end <= start {
            // chunk_size is smaller than the character at `start`.
            hard_end = ceil_char_boundary(text, start + 1);
        }
        if hard_end >= text.len() {
            return text.len();
        }

        let window = &text[start..hard_end];
        // A boundary is usable only if the next chunk still moves forward
        // after backing up by the overlap.
        let min_end = start + self.overlap;

        if let Some(pos) = window.rfind(PARAGRAPH_BREAK) {
            let end = start + pos + PARAGRAPH_BREAK.len();
            if end > min_end {
                return end;
            }
        }

        let mut best = None;
        for sep in SENTENCE_BREAKS {
            if let Some(pos) = window.rfind(sep) {
                let end = start + pos + sep.len();
                if end > min_end && best.is_none_or(|b| end > b) {
                    best = Some(end);
                }
            }
        }

        best.unwrap_or(hard_end)
    }
}

/// Largest char boundary less than or equal to `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary greater than or equal to `index`.
fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
