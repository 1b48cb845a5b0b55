use thiserror::Error;

use docflow_core::DocumentId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error("storage backend error: {0}")]
    Backend(String),
}
