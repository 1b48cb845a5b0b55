use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::status::DocumentStatus;

/// Unique document identifier.
pub type DocumentId = Uuid;

/// Unique segment identifier.
pub type SegmentId = Uuid;

/// One uploaded source file and its processing state.
///
/// Created by the upload boundary; only the processing pipeline mutates it
/// afterwards (status, status_message, updated_at). Never deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// Original filename as uploaded.
    pub filename: String,
    /// Location of the stored bytes, owned by the storage collaborator.
    pub stored_path: PathBuf,
    pub content_type: Option<String>,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    /// Human-readable note for the current status. Always non-empty for
    /// `ExtractionFailed`.
    pub status_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a freshly uploaded document record.
    pub fn new(
        filename: impl Into<String>,
        stored_path: impl Into<PathBuf>,
        content_type: Option<String>,
        size_bytes: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            stored_path: stored_path.into(),
            content_type,
            size_bytes,
            status: DocumentStatus::Uploaded,
            status_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `to`, stamping `status_message` and `updated_at`.
    ///
    /// Rejects anything outside the legal transition set.
    pub fn transition(
        &mut self,
        to: DocumentStatus,
        message: Option<String>,
    ) -> Result<(), CoreError> {
        if !self.status.can_transition_to(to) {
            return Err(CoreError::IllegalTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.status_message = message;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// One bounded-length, ordered chunk of a document's extracted text.
///
/// Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    /// Owning document (back-reference, no ownership).
    pub document_id: DocumentId,
    /// Zero-based position within the document, contiguous per document.
    pub order: u32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Segment {
    pub fn new(document_id: DocumentId, order: u32, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            order,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}
