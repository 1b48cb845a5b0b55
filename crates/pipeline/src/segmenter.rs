//! Length-bounded text segmentation.
//!
//! Raw blocks are split on paragraph boundaries, greedily packed up to the
//! length bound, and oversized paragraphs are cut at sentence boundaries.

use crate::extract::split_on_blank_lines;

/// Maximum characters per segment.
pub const MAX_SEGMENT_LENGTH: usize = 5000;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '?' | '!')
}

/// Pure, deterministic segmentation of one raw text block.
///
/// Lengths are measured in `char`s, not bytes, so multi-byte input never
/// splits inside a code point.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    max_len: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(MAX_SEGMENT_LENGTH)
    }
}

impl Segmenter {
    /// `max_len` is clamped to at least 1; a zero bound would make the
    /// long-paragraph cursor unable to advance.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }

    /// Split `block` into ordered segments, each non-empty after trimming and
    /// at most `max_len` chars.
    ///
    /// Paragraphs are packed greedily, joined with the paragraph separator;
    /// a paragraph that alone exceeds the bound is cut at sentence boundaries
    /// instead of entering the running buffer.
    pub fn segment(&self, block: &str) -> Vec<String> {
        let mut segments = Vec::new();
        let mut buffer = String::new();
        let mut buffer_chars = 0usize;

        for paragraph in split_on_blank_lines(block) {
            let paragraph_chars = paragraph.chars().count();

            if paragraph_chars > self.max_len {
                // Oversized paragraphs bypass the buffer entirely.
                if !buffer.is_empty() {
                    segments.push(std::mem::take(&mut buffer));
                    buffer_chars = 0;
                }
                segments.extend(self.split_long_paragraph(paragraph));
                continue;
            }

            let separator_chars = if buffer.is_empty() {
                0
            } else {
                PARAGRAPH_SEPARATOR.len()
            };
            if buffer_chars + separator_chars + paragraph_chars > self.max_len {
                segments.push(std::mem::take(&mut buffer));
                buffer_chars = 0;
            }

            if !buffer.is_empty() {
                buffer.push_str(PARAGRAPH_SEPARATOR);
                buffer_chars += PARAGRAPH_SEPARATOR.len();
            }
            buffer.push_str(paragraph);
            buffer_chars += paragraph_chars;
        }

        if !buffer.is_empty() {
            segments.push(buffer);
        }
        segments
    }

    /// Cut an over-length paragraph into chunks of at most `max_len` chars,
    /// preferring the last sentence boundary in each window and falling back
    /// to a hard cut at exactly `max_len`.
    fn split_long_paragraph(&self, paragraph: &str) -> Vec<String> {
        let chars: Vec<char> = paragraph.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let window_end = (start + self.max_len).min(chars.len());
            let mut end = window_end;

            if window_end < chars.len() {
                // Last `.`, `?`, or `!` whose cut point stays within the
                // window; a boundary at the very start would yield an empty
                // chunk and is ignored.
                if let Some(p) = chars[start..window_end]
                    .iter()
                    .rposition(|&c| is_sentence_end(c))
                {
                    if p > 0 {
                        end = start + p + 1;
                    }
                }
            }

            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }
            start = end;
        }
        chunks
    }
}
