use serde::{Deserialize, Serialize};

/// Processing state of a document.
///
/// The embedding states are reserved for the downstream embedding stage and
/// are never produced by the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// File is uploaded, no processing started.
    Uploaded,
    /// Parsing and segmentation is ongoing.
    ExtractionInProgress,
    /// All text extracted and segmented, segments saved.
    ExtractionCompleted,
    /// Parsing or segmentation failed.
    ExtractionFailed,
    /// Segments are ready for embedding (reserved).
    EmbeddingPending,
    /// All segments embedded (reserved).
    EmbeddingCompleted,
    /// Embedding failed (reserved).
    EmbeddingFailed,
}

impl DocumentStatus {
    /// Whether moving from `self` to `to` is a legal transition.
    ///
    /// The extraction pipeline only ever performs:
    /// `Uploaded -> ExtractionInProgress -> ExtractionCompleted | ExtractionFailed`.
    pub fn can_transition_to(self, to: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, to),
            (Uploaded, ExtractionInProgress)
                | (ExtractionInProgress, ExtractionCompleted)
                | (ExtractionInProgress, ExtractionFailed)
        )
    }

    /// Terminal states are never left by the extraction pipeline; re-processing
    /// requires an explicit new dispatch.
    pub fn is_terminal(self) -> bool {
        use DocumentStatus::*;
        matches!(
            self,
            ExtractionCompleted | ExtractionFailed | EmbeddingCompleted | EmbeddingFailed
        )
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentStatus::Uploaded => "UPLOADED",
            DocumentStatus::ExtractionInProgress => "EXTRACTION_IN_PROGRESS",
            DocumentStatus::ExtractionCompleted => "EXTRACTION_COMPLETED",
            DocumentStatus::ExtractionFailed => "EXTRACTION_FAILED",
            DocumentStatus::EmbeddingPending => "EMBEDDING_PENDING",
            DocumentStatus::EmbeddingCompleted => "EMBEDDING_COMPLETED",
            DocumentStatus::EmbeddingFailed => "EMBEDDING_FAILED",
        };
        write!(f, "{s}")
    }
}
