//! Store traits the file orchestrator is written against.
//!
//! These traits define the interfaces that concrete store implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{FileMeta, FileQuery, StoredObject};

// =============================================================================
// METADATA STORE
// =============================================================================

/// Searchable store of file metadata records.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert or replace the record with `meta.id`.
    ///
    /// An existing record keeps its original `create_time`.
    async fn save(&self, meta: &FileMeta) -> Result<()>;

    /// Fetch a record by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<FileMeta>>;

    /// Records matching the query, newest write first, at most `query.limit`.
    async fn query_by_tags(&self, query: &FileQuery) -> Result<Vec<FileMeta>>;

    /// Delete a record. Deleting an absent id is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Delete every record, returning how many were removed.
    async fn delete_all(&self) -> Result<u64>;
}

// =============================================================================
// OBJECT STORE
// =============================================================================

/// Key-addressed blob storage.
///
/// Allows abstracting over filesystem, in-memory, or cloud providers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a blob, replacing any existing object at `key`.
    async fn save(&self, key: &str, content_type: &str, data: &[u8]) -> Result<()>;

    /// Read a blob and the content type it was saved with, `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Delete a blob. Deleting an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a blob exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete every blob in the store, returning how many were removed.
    async fn batch_delete(&self) -> Result<u64>;
}
