//! In-memory store implementations backed by `tokio::sync::RwLock`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use docflow_core::{Document, DocumentId, Segment};

use crate::error::StoreError;
use crate::{DocumentStore, SegmentStore};

/// HashMap-backed [`DocumentStore`].
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: DocumentId) -> Result<Document, StoreError> {
        self.documents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, document: Document) -> Result<(), StoreError> {
        debug!(document_id = %document.id, status = %document.status, "saving document");
        self.documents.write().await.insert(document.id, document);
        Ok(())
    }
}

/// Per-document segment lists kept in append order.
#[derive(Default)]
pub struct MemorySegmentStore {
    segments: RwLock<HashMap<DocumentId, Vec<Segment>>>,
}

impl MemorySegmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SegmentStore for MemorySegmentStore {
    async fn append(&self, segment: Segment) -> Result<(), StoreError> {
        debug!(
            document_id = %segment.document_id,
            order = segment.order,
            chars = segment.text.chars().count(),
            "appending segment"
        );
        self.segments
            .write()
            .await
            .entry(segment.document_id)
            .or_default()
            .push(segment);
        Ok(())
    }

    async fn list_by_document(&self, id: DocumentId) -> Result<Vec<Segment>, StoreError> {
        let mut segments = self
            .segments
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default();
        segments.sort_by_key(|s| s.order);
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new("notes.txt", "/tmp/notes.txt", Some("text/plain".into()), 42)
    }

    #[tokio::test]
    async fn get_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let id = uuid::Uuid::new_v4();
        let err = store.get(id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let store = MemoryDocumentStore::new();
        let mut d = doc();
        store.save(d.clone()).await.unwrap();

        d.status_message = Some("updated".into());
        store.save(d.clone()).await.unwrap();

        let fetched = store.get(d.id).await.unwrap();
        assert_eq!(fetched.status_message.as_deref(), Some("updated"));
    }

    #[tokio::test]
    async fn list_by_document_sorts_by_order() {
        let store = MemorySegmentStore::new();
        let d = doc();
        let other = doc();

        // Interleave appends across two documents, out of order for `d`.
        store.append(Segment::new(d.id, 1, "second")).await.unwrap();
        store.append(Segment::new(other.id, 0, "unrelated")).await.unwrap();
        store.append(Segment::new(d.id, 0, "first")).await.unwrap();
        store.append(Segment::new(d.id, 2, "third")).await.unwrap();

        let segments = store.list_by_document(d.id).await.unwrap();
        let orders: Vec<u32> = segments.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(segments[0].text, "first");
        assert_eq!(segments[2].text, "third");
    }

    #[tokio::test]
    async fn list_for_unknown_document_is_empty() {
        let store = MemorySegmentStore::new();
        let segments = store.list_by_document(uuid::Uuid::new_v4()).await.unwrap();
        assert!(segments.is_empty());
    }
}
