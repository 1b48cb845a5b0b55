//! Persistence boundary for documents and segments.
//!
//! The pipeline only talks to the [`DocumentStore`] and [`SegmentStore`]
//! traits; [`memory`] provides the in-process reference implementation used
//! by tests and the worker binary. Database-backed implementations plug in
//! behind the same traits.

pub mod error;
pub mod memory;

use async_trait::async_trait;

use docflow_core::{Document, DocumentId, Segment};

pub use error::StoreError;
pub use memory::{MemoryDocumentStore, MemorySegmentStore};

/// Keyed store for document records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, id: DocumentId) -> Result<Document, StoreError>;

    /// Idempotent upsert. Used for every status transition.
    async fn save(&self, document: Document) -> Result<(), StoreError>;
}

/// Append-only store for segments, readable in `order` order.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Persist one segment. Segments are never mutated after creation.
    async fn append(&self, segment: Segment) -> Result<(), StoreError>;

    /// All segments of a document, sorted by ascending `order`.
    async fn list_by_document(&self, id: DocumentId) -> Result<Vec<Segment>, StoreError>;
}
