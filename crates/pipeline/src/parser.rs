//! Parsing capability boundary.
//!
//! Format-specific parsers live behind [`DocumentParser`] and feed their
//! event stream into a [`ContentSink`]. The built-in [`PlainTextParser`]
//! covers `text/plain` and is what the worker binary and tests use; richer
//! format support plugs in behind the same trait.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::PipelineError;
use crate::extract::ContentSink;

/// Turns a stored file into a parse-event stream.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Parse the file at `path`, emitting events into `sink` in document
    /// order, ending with exactly one `document_end`.
    ///
    /// Fails with [`PipelineError::Parse`] on malformed or unsupported input
    /// and [`PipelineError::Io`] on read failure.
    async fn parse(
        &self,
        path: &Path,
        content_type_hint: Option<&str>,
        sink: &mut (dyn ContentSink + Send),
    ) -> Result<(), PipelineError>;
}

/// Parser for plain text: every blank-line-separated paragraph becomes one
/// text run closed by a paragraph end.
pub struct PlainTextParser;

#[async_trait]
impl DocumentParser for PlainTextParser {
    async fn parse(
        &self,
        path: &Path,
        content_type_hint: Option<&str>,
        sink: &mut (dyn ContentSink + Send),
    ) -> Result<(), PipelineError> {
        debug!(path = %path.display(), hint = ?content_type_hint, "parsing as plain text");
        let bytes = tokio::fs::read(path).await?;
        // Try UTF-8 first, fall back to lossy conversion.
        let text = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());

        for paragraph in text.split("\n\n") {
            if paragraph.trim().is_empty() {
                continue;
            }
            sink.text(paragraph);
            sink.element_end("p");
        }
        sink.document_end();
        Ok(())
    }
}
