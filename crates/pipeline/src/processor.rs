//! Per-document orchestration: extraction, segmentation, persistence, and
//! status transitions.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info};

use docflow_core::{Document, DocumentId, DocumentStatus, Segment};
use docflow_store::{DocumentStore, SegmentStore, StoreError};

use crate::error::PipelineError;
use crate::extract::BlockExtractor;
use crate::parser::DocumentParser;
use crate::segmenter::Segmenter;

/// Result of one processing run, as recorded on the document.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOutcome {
    pub status: DocumentStatus,
    /// Segments persisted before the run finished. Partial writes of a
    /// failed run are counted too; they are kept, not rolled back.
    pub segments_written: u32,
}

/// Drives one document through extraction and segmentation.
///
/// Each run is independent: it owns its extractor buffer and order counter,
/// and only touches its own document's records.
pub struct Processor {
    documents: Arc<dyn DocumentStore>,
    segments: Arc<dyn SegmentStore>,
    parser: Arc<dyn DocumentParser>,
    segmenter: Segmenter,
}

impl Processor {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        segments: Arc<dyn SegmentStore>,
        parser: Arc<dyn DocumentParser>,
        segmenter: Segmenter,
    ) -> Self {
        Self {
            documents,
            segments,
            parser,
            segmenter,
        }
    }

    /// Process one uploaded document end-to-end.
    ///
    /// Recoverable failures (parse, IO, segment writes) are absorbed into a
    /// terminal `ExtractionFailed` status and reported via `Ok(outcome)`;
    /// `Err` means the run could not even record its outcome: an unknown
    /// document id, or a failed status write.
    pub async fn process(&self, id: DocumentId) -> Result<ProcessOutcome, PipelineError> {
        // An unknown id is fatal for the run: there is no record to mark failed.
        let mut document = self.documents.get(id).await?;
        info!(document_id = %id, filename = %document.filename, "starting document processing");

        document.transition(DocumentStatus::ExtractionInProgress, None)?;
        self.documents.save(document.clone()).await?;

        // A panic anywhere in extraction or segmentation must not take the
        // worker down; it is recorded like any other failure.
        let result = AssertUnwindSafe(self.extract_and_segment(&document))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err((0, PipelineError::Unexpected(panic_message(panic.as_ref()))))
            });

        match result {
            Ok(count) => {
                document.transition(
                    DocumentStatus::ExtractionCompleted,
                    Some(format!(
                        "text extraction and segmentation completed, {count} segments"
                    )),
                )?;
                self.documents.save(document).await?;
                info!(document_id = %id, segments = count, "document processing completed");
                Ok(ProcessOutcome {
                    status: DocumentStatus::ExtractionCompleted,
                    segments_written: count,
                })
            }
            Err((written, e)) => {
                error!(document_id = %id, error = %e, "document processing failed");
                document.transition(
                    DocumentStatus::ExtractionFailed,
                    Some(format!("extraction failed: {e}")),
                )?;
                self.documents.save(document).await?;
                Ok(ProcessOutcome {
                    status: DocumentStatus::ExtractionFailed,
                    segments_written: written,
                })
            }
        }
    }

    /// Run the parse stream through the extractor, segment each raw block,
    /// and persist segments with a contiguous order index.
    ///
    /// On failure, returns the number of segments already persisted alongside
    /// the error so the caller can report partial progress.
    async fn extract_and_segment(
        &self,
        document: &Document,
    ) -> Result<u32, (u32, PipelineError)> {
        let mut extractor = BlockExtractor::new();
        self.parser
            .parse(
                &document.stored_path,
                document.content_type.as_deref(),
                &mut extractor,
            )
            .await
            .map_err(|e| (0, e))?;

        let blocks = extractor.into_blocks();
        let mut order: u32 = 0;
        for block in &blocks {
            for text in self.segmenter.segment(block) {
                let segment = Segment::new(document.id, order, text);
                self.segments
                    .append(segment)
                    .await
                    .map_err(|e: StoreError| (order, PipelineError::Store(e)))?;
                order += 1;
            }
        }
        info!(
            document_id = %document.id,
            blocks = blocks.len(),
            segments = order,
            "extraction finished"
        );
        Ok(order)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during extraction".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ContentSink;
    use crate::parser::PlainTextParser;
    use async_trait::async_trait;
    use docflow_store::{MemoryDocumentStore, MemorySegmentStore};
    use std::io::Write;
    use std::path::Path;

    /// Parser that replays a fixed event script, optionally erroring mid-stream.
    struct ScriptedParser {
        events: Vec<ScriptEvent>,
    }

    enum ScriptEvent {
        Text(&'static str),
        ElementEnd(&'static str),
        DocumentEnd,
        Fail(&'static str),
    }

    #[async_trait]
    impl DocumentParser for ScriptedParser {
        async fn parse(
            &self,
            _path: &Path,
            _content_type_hint: Option<&str>,
            sink: &mut (dyn ContentSink + Send),
        ) -> Result<(), PipelineError> {
            for event in &self.events {
                match event {
                    ScriptEvent::Text(run) => sink.text(run),
                    ScriptEvent::ElementEnd(tag) => sink.element_end(tag),
                    ScriptEvent::DocumentEnd => sink.document_end(),
                    ScriptEvent::Fail(msg) => {
                        return Err(PipelineError::Parse(msg.to_string()))
                    }
                }
            }
            Ok(())
        }
    }

    struct Fixture {
        documents: Arc<MemoryDocumentStore>,
        segments: Arc<MemorySegmentStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                documents: Arc::new(MemoryDocumentStore::new()),
                segments: Arc::new(MemorySegmentStore::new()),
            }
        }

        fn processor(&self, parser: Arc<dyn DocumentParser>) -> Processor {
            Processor::new(
                self.documents.clone(),
                self.segments.clone(),
                parser,
                Segmenter::default(),
            )
        }

        async fn uploaded_document(&self) -> Document {
            let d = Document::new("doc.txt", "/unused", Some("text/plain".into()), 0);
            self.documents.save(d.clone()).await.unwrap();
            d
        }
    }

    #[tokio::test]
    async fn two_block_paragraphs_become_ordered_segments() {
        let fx = Fixture::new();
        let parser = ScriptedParser {
            events: vec![
                ScriptEvent::Text("First paragraph."),
                ScriptEvent::ElementEnd("p"),
                ScriptEvent::Text("Second paragraph."),
                ScriptEvent::ElementEnd("p"),
                ScriptEvent::DocumentEnd,
            ],
        };
        let processor = fx.processor(Arc::new(parser));
        let d = fx.uploaded_document().await;

        let outcome = processor.process(d.id).await.unwrap();
        assert_eq!(outcome.status, DocumentStatus::ExtractionCompleted);
        assert_eq!(outcome.segments_written, 2);

        let stored = fx.documents.get(d.id).await.unwrap();
        assert_eq!(stored.status, DocumentStatus::ExtractionCompleted);
        assert!(stored.status_message.is_some());

        let segments = fx.segments.list_by_document(d.id).await.unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].order, 0);
        assert_eq!(segments[0].text, "First paragraph.");
        assert_eq!(segments[1].order, 1);
        assert_eq!(segments[1].text, "Second paragraph.");
    }

    #[tokio::test]
    async fn parse_failure_mid_stream_marks_document_failed() {
        let fx = Fixture::new();
        let parser = ScriptedParser {
            events: vec![
                ScriptEvent::Text("Partial text before the failure."),
                ScriptEvent::ElementEnd("p"),
                ScriptEvent::Fail("truncated stream"),
            ],
        };
        let processor = fx.processor(Arc::new(parser));
        let d = fx.uploaded_document().await;

        let outcome = processor.process(d.id).await.unwrap();
        assert_eq!(outcome.status, DocumentStatus::ExtractionFailed);
        assert_eq!(outcome.segments_written, 0);

        let stored = fx.documents.get(d.id).await.unwrap();
        assert_eq!(stored.status, DocumentStatus::ExtractionFailed);
        let message = stored.status_message.unwrap();
        assert!(!message.is_empty());
        assert!(message.contains("truncated stream"));

        // Nothing was appended after the failure point.
        let segments = fx.segments.list_by_document(d.id).await.unwrap();
        assert!(segments.is_empty());
    }

    #[tokio::test]
    async fn panic_during_extraction_marks_document_failed() {
        struct PanickingParser;

        #[async_trait]
        impl DocumentParser for PanickingParser {
            async fn parse(
                &self,
                _path: &Path,
                _content_type_hint: Option<&str>,
                _sink: &mut (dyn ContentSink + Send),
            ) -> Result<(), PipelineError> {
                panic!("corrupt page table");
            }
        }

        let fx = Fixture::new();
        let processor = fx.processor(Arc::new(PanickingParser));
        let d = fx.uploaded_document().await;

        // The panic is contained and recorded; the caller sees a normal
        // failed outcome, not an unwinding worker.
        let outcome = processor.process(d.id).await.unwrap();
        assert_eq!(outcome.status, DocumentStatus::ExtractionFailed);
        assert_eq!(outcome.segments_written, 0);

        let stored = fx.documents.get(d.id).await.unwrap();
        let message = stored.status_message.unwrap();
        assert!(message.contains("unexpected error"));
        assert!(message.contains("corrupt page table"));
    }

    #[tokio::test]
    async fn unknown_document_id_aborts_without_status_write() {
        let fx = Fixture::new();
        let processor = fx.processor(Arc::new(PlainTextParser));
        let id = uuid::Uuid::new_v4();

        let err = processor.process(id).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Store(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_stored_file_marks_document_failed() {
        let fx = Fixture::new();
        let processor = fx.processor(Arc::new(PlainTextParser));
        let d = Document::new("gone.txt", "/nonexistent/docflow", None, 0);
        fx.documents.save(d.clone()).await.unwrap();

        let outcome = processor.process(d.id).await.unwrap();
        assert_eq!(outcome.status, DocumentStatus::ExtractionFailed);
        let stored = fx.documents.get(d.id).await.unwrap();
        assert!(stored.status_message.unwrap().contains("IO error"));
    }

    #[tokio::test]
    async fn end_to_end_with_plain_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Intro paragraph.\n\nBody paragraph with more words.").unwrap();

        let fx = Fixture::new();
        let processor = fx.processor(Arc::new(PlainTextParser));
        let d = Document::new(
            "upload.txt",
            file.path(),
            Some("text/plain".into()),
            file.as_file().metadata().unwrap().len(),
        );
        fx.documents.save(d.clone()).await.unwrap();

        let outcome = processor.process(d.id).await.unwrap();
        assert_eq!(outcome.status, DocumentStatus::ExtractionCompleted);

        let segments = fx.segments.list_by_document(d.id).await.unwrap();
        let orders: Vec<u32> = segments.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(segments[0].text, "Intro paragraph.");
    }

    #[tokio::test]
    async fn order_is_contiguous_across_blocks() {
        let fx = Fixture::new();
        // Three blocks; the middle one splits under the small test bound.
        let parser = ScriptedParser {
            events: vec![
                ScriptEvent::Text("aaaa"),
                ScriptEvent::ElementEnd("p"),
                ScriptEvent::Text("bbbbbbbbbbbbbbbbbbbbbbbb"),
                ScriptEvent::ElementEnd("p"),
                ScriptEvent::Text("cccc"),
                ScriptEvent::ElementEnd("p"),
                ScriptEvent::DocumentEnd,
            ],
        };
        let processor = Processor::new(
            fx.documents.clone(),
            fx.segments.clone(),
            Arc::new(parser),
            Segmenter::new(10),
        );
        let d = fx.uploaded_document().await;

        processor.process(d.id).await.unwrap();

        let segments = fx.segments.list_by_document(d.id).await.unwrap();
        let orders: Vec<u32> = segments.iter().map(|s| s.order).collect();
        let expected: Vec<u32> = (0..segments.len() as u32).collect();
        assert_eq!(orders, expected, "orders must be contiguous from zero");
        // Middle block (24 chars, bound 10) splits into three pieces.
        assert_eq!(segments.len(), 5);
    }
}
