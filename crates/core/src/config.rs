use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            storage: StorageConfig::from_env(),
            pipeline: PipelineConfig::from_env(),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  storage:   upload_dir={}", self.storage.upload_dir.display());
        tracing::info!(
            "  pipeline:  workers={}, queue_capacity={}, max_segment_length={}",
            self.pipeline.workers,
            self.pipeline.queue_capacity,
            self.pipeline.max_segment_length,
        );
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where the upload boundary places stored files.
    pub upload_dir: PathBuf,
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            upload_dir: PathBuf::from(env_or("DOCFLOW_UPLOAD_DIR", "data/uploads")),
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent processing workers.
    pub workers: usize,
    /// Bounded dispatch queue depth.
    pub queue_capacity: usize,
    /// Maximum characters per segment.
    pub max_segment_length: usize,
}

impl PipelineConfig {
    fn from_env() -> Self {
        Self {
            workers: env_usize("DOCFLOW_WORKERS", 4),
            queue_capacity: env_usize("DOCFLOW_QUEUE_CAPACITY", 64),
            max_segment_length: env_usize("DOCFLOW_MAX_SEGMENT_LENGTH", 5000),
        }
    }
}
