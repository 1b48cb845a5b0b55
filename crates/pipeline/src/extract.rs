//! Streaming content extraction: parse events in, raw text blocks out.

use tracing::debug;

/// Tags whose end marks a hard paragraph break during extraction.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "h1", "h2", "h3", "h4", "h5", "h6", "li",
];

fn is_block_level(tag: &str) -> bool {
    BLOCK_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

/// Narrow callback interface for a format-agnostic parser's event stream.
///
/// Parsers emit text runs and element boundaries in document order and finish
/// with exactly one `document_end`.
pub trait ContentSink: Send {
    fn text(&mut self, run: &str);
    fn element_start(&mut self, tag: &str);
    fn element_end(&mut self, tag: &str);
    fn document_end(&mut self);
}

/// Collects a parse-event stream into paragraph-delimited raw text blocks.
///
/// Text runs are appended verbatim to one growing buffer; the end of a
/// block-level element appends a blank-line marker instead of flushing, so
/// inline markup never fragments a sentence. [`into_blocks`](Self::into_blocks)
/// splits on blank-line runs at the end. Single forward pass over the stream.
#[derive(Default)]
pub struct BlockExtractor {
    buffer: String,
}

impl BlockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The trimmed, non-empty raw text blocks in document order.
    pub fn into_blocks(self) -> Vec<String> {
        split_on_blank_lines(&self.buffer)
            .map(str::to_string)
            .collect()
    }
}

impl ContentSink for BlockExtractor {
    fn text(&mut self, run: &str) {
        self.buffer.push_str(run);
    }

    fn element_start(&mut self, _tag: &str) {}

    fn element_end(&mut self, tag: &str) {
        if is_block_level(tag) {
            self.buffer.push_str("\n\n");
        }
    }

    fn document_end(&mut self) {
        debug!(buffered_chars = self.buffer.chars().count(), "parse stream finished");
    }
}

/// Split on runs of two or more newlines; trim pieces and drop empties.
///
/// Adjacent break markers from nested block elements collapse here, so the
/// result never contains empty intermediate blocks.
pub(crate) fn split_on_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}
