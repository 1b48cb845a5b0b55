use thiserror::Error;

use docflow_core::CoreError;
use docflow_store::StoreError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}
