//! In-memory stores for tests and local development.
//!
//! Both stores implement the same traits as the PostgreSQL and filesystem
//! backends and are selected with `METADATA_BACKEND=memory` /
//! `STORAGE_BACKEND=memory`. Contents are lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use lds_core::{
    validate_storage_key, FileMeta, FileQuery, MetadataStore, ObjectStore, Result, StoredObject,
};

// =============================================================================
// METADATA
// =============================================================================

/// In-memory metadata store.
#[derive(Clone, Default)]
pub struct MemoryMetadataStore {
    records: Arc<RwLock<HashMap<Uuid, FileMeta>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn save(&self, meta: &FileMeta) -> Result<()> {
        let mut records = self.records.write().await;
        let mut meta = meta.clone();
        if let Some(existing) = records.get(&meta.id) {
            meta.create_time = existing.create_time;
        }
        records.insert(meta.id, meta);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<FileMeta>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn query_by_tags(&self, query: &FileQuery) -> Result<Vec<FileMeta>> {
        let limit = usize::try_from(query.limit).unwrap_or(0);
        let records = self.records.read().await;

        let mut matched: Vec<FileMeta> = records
            .values()
            .filter(|meta| query.matches(meta))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.order_no.cmp(&a.order_no));
        matched.truncate(limit);
        Ok(matched)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}

// =============================================================================
// OBJECTS
// =============================================================================

/// In-memory object store.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn save(&self, key: &str, content_type: &str, data: &[u8]) -> Result<()> {
        validate_storage_key(key)?;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data: data.to_vec(),
            },
        );
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_storage_key(key)?;
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_storage_key(key)?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        validate_storage_key(key)?;
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn batch_delete(&self) -> Result<u64> {
        let mut objects = self.objects.write().await;
        let removed = objects.len() as u64;
        objects.clear();
        Ok(removed)
    }
}
