//! docflow-worker — process plain-text files through the extraction pipeline.
//!
//! Creates a document record per input file, dispatches them onto the worker
//! pool, waits for every document to reach a terminal status, and logs a
//! per-document summary. Exits non-zero if any document failed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use docflow_core::config::{self, Config};
use docflow_core::{Document, DocumentId, DocumentStatus};
use docflow_pipeline::{Dispatcher, PlainTextParser, Processor, Segmenter};
use docflow_store::{DocumentStore, MemoryDocumentStore, MemorySegmentStore, SegmentStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Extract and segment uploaded documents.
#[derive(Parser, Debug)]
#[command(name = "docflow-worker", version, about)]
struct Cli {
    /// Files to process.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Content type hint passed to the parser.
    #[arg(long, default_value = "text/plain")]
    content_type: String,

    /// Number of processing workers.
    #[arg(long, env = "DOCFLOW_WORKERS")]
    workers: Option<usize>,

    /// Dispatch queue capacity.
    #[arg(long, env = "DOCFLOW_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Maximum characters per segment.
    #[arg(long, env = "DOCFLOW_MAX_SEGMENT_LENGTH")]
    max_segment_length: Option<usize>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let workers = cli.workers.unwrap_or(config.pipeline.workers);
    let queue_capacity = cli.queue_capacity.unwrap_or(config.pipeline.queue_capacity);
    let max_segment_length = cli
        .max_segment_length
        .unwrap_or(config.pipeline.max_segment_length);

    let documents = Arc::new(MemoryDocumentStore::new());
    let segments = Arc::new(MemorySegmentStore::new());
    let processor = Arc::new(Processor::new(
        documents.clone(),
        segments.clone(),
        Arc::new(PlainTextParser),
        Segmenter::new(max_segment_length),
    ));
    let dispatcher = Dispatcher::start(processor, workers, queue_capacity);

    // Register and dispatch every input file.
    let mut ids: Vec<DocumentId> = Vec::new();
    for path in &cli.files {
        let size = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat file, skipping");
                continue;
            }
        };
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let document = Document::new(filename, path, Some(cli.content_type.clone()), size);
        let id = document.id;
        documents.save(document).await?;
        match dispatcher.dispatch(id) {
            Ok(()) => ids.push(id),
            Err(e) => error!(path = %path.display(), error = %e, "dispatch failed"),
        }
    }

    if ids.is_empty() {
        anyhow::bail!("no files were dispatched");
    }
    info!(count = ids.len(), "dispatched, waiting for completion");

    wait_for_terminal(documents.as_ref(), &ids).await;
    dispatcher.close().await;

    // Summarize.
    let mut failures = 0;
    for id in &ids {
        let document = documents.get(*id).await?;
        let segment_count = segments.list_by_document(*id).await?.len();
        match document.status {
            DocumentStatus::ExtractionCompleted => info!(
                document_id = %id,
                filename = %document.filename,
                segments = segment_count,
                "completed"
            ),
            status => {
                failures += 1;
                error!(
                    document_id = %id,
                    filename = %document.filename,
                    status = %status,
                    message = document.status_message.as_deref().unwrap_or(""),
                    "not completed"
                );
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} document(s) failed");
    }
    Ok(())
}

async fn wait_for_terminal(documents: &MemoryDocumentStore, ids: &[DocumentId]) {
    loop {
        let mut all_terminal = true;
        for id in ids {
            match documents.get(*id).await {
                Ok(d) if d.status.is_terminal() => {}
                _ => {
                    all_terminal = false;
                    break;
                }
            }
        }
        if all_terminal {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
