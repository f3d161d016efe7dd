//! File orchestrator.
//!
//! Keeps the metadata store and the object store pointing at the same
//! storage keys across upload, update, delete and reset.
//!
//! Write order for every file is metadata first, then blob, then thumbnail.
//! There is no transaction spanning the two stores: a failure after the
//! metadata write leaves a record whose blob is missing, and a failure after
//! deleting old blobs during replacement leaves the old record pointing at
//! nothing. Concurrent content replacements of one id can orphan the loser's
//! blob. None of these are reconciled automatically.

use std::sync::Arc;
use std::time::Instant;

use lds_core::{
    detect_content_type, file_bucket_path, is_thumbnailable_mime, sanitize_filename, Error,
    FileMeta, FileQuery, FileRecord, FileUpload, MetadataStore, NewFileMeta, ObjectStore, Result,
    StoredObject,
};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::FileServiceConfig;
use crate::services::thumbnail::{generate_thumbnail, Thumbnail};

/// Coordinates the metadata store, object store and thumbnail generator.
#[derive(Clone)]
pub struct FileService {
    metadata: Arc<dyn MetadataStore>,
    objects: Arc<dyn ObjectStore>,
    config: FileServiceConfig,
}

impl FileService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        objects: Arc<dyn ObjectStore>,
        config: FileServiceConfig,
    ) -> Self {
        Self {
            metadata,
            objects,
            config,
        }
    }

    pub fn config(&self) -> &FileServiceConfig {
        &self.config
    }

    /// Upload a batch of files sharing one tag list.
    ///
    /// Each file gets a fresh id that doubles as its first storage key.
    /// Results are in input order. A failure aborts the remaining files;
    /// files already written stay committed.
    pub async fn upload_files(
        &self,
        files: Vec<FileUpload>,
        tags: Vec<String>,
    ) -> Result<Vec<FileRecord>> {
        trace!("entering upload_files()");
        let start = Instant::now();
        let mut records = Vec::with_capacity(files.len());

        for upload in files {
            let file_id = Uuid::new_v4();
            let record = self
                .create_or_update_file(upload, tags.clone(), file_id, file_id)
                .await?;
            records.push(record);
        }

        info!(
            subsystem = "api",
            component = "file_service",
            op = "upload",
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "files uploaded"
        );
        Ok(records)
    }

    /// Update tags, and optionally content, of an existing file.
    ///
    /// Without new content only the tags change; path, size and thumbnail
    /// stay as they are. With new content the old blob and thumbnail are
    /// deleted first and the content is written under a fresh storage key.
    /// The record id never changes.
    pub async fn update_file(
        &self,
        existing: &FileMeta,
        new_content: Option<FileUpload>,
        tags: Vec<String>,
    ) -> Result<FileRecord> {
        trace!("entering update_file()");

        let Some(upload) = new_content else {
            return self
                .save_meta(NewFileMeta {
                    id: existing.id,
                    path: existing.path.clone(),
                    name: existing.name.clone(),
                    tags,
                    size: existing.size,
                    content_type: existing.content_type.clone(),
                    is_image: existing.is_image,
                })
                .await;
        };

        self.delete_blobs(existing).await?;
        let storage_id = Uuid::new_v4();
        self.create_or_update_file(upload, tags, existing.id, storage_id)
            .await
    }

    /// Delete a file's record, then its blob and thumbnail.
    pub async fn delete_file(&self, existing: &FileMeta) -> Result<()> {
        trace!("entering delete_file()");
        self.metadata.delete(existing.id).await?;
        self.delete_blobs(existing).await?;

        info!(
            subsystem = "api",
            component = "file_service",
            op = "delete",
            file_id = %existing.id,
            "file deleted"
        );
        Ok(())
    }

    /// Search by tags, newest write first.
    pub async fn search_files(
        &self,
        tags: Vec<String>,
        order_no: Option<String>,
        size: i64,
    ) -> Result<Vec<FileRecord>> {
        trace!("entering search_files()");
        let query = FileQuery::new(tags, order_no, size);
        let metas = self.metadata.query_by_tags(&query).await?;
        Ok(metas.into_iter().map(FileRecord::from).collect())
    }

    /// Look up a file's metadata; `None` when the id is unknown.
    pub async fn get_file(&self, file_id: Uuid) -> Result<Option<FileMeta>> {
        trace!("entering get_file()");
        self.metadata.get_by_id(file_id).await
    }

    /// Wipe every record, then every blob.
    pub async fn reset(&self) -> Result<()> {
        trace!("entering reset()");
        let records = self.metadata.delete_all().await?;
        let blobs = self.objects.batch_delete().await?;

        info!(
            subsystem = "api",
            component = "file_service",
            op = "reset",
            records,
            blobs,
            "all files deleted"
        );
        Ok(())
    }

    /// Fetch stored bytes and the content type they were saved with.
    pub async fn read_blob(&self, path: &str) -> Result<Option<StoredObject>> {
        trace!("entering read_blob()");
        self.objects.read(path).await
    }

    /// Save metadata for `file_id` pointing at a key built from `storage_id`,
    /// then write the blob and, for images, the thumbnail.
    async fn create_or_update_file(
        &self,
        upload: FileUpload,
        tags: Vec<String>,
        file_id: Uuid,
        storage_id: Uuid,
    ) -> Result<FileRecord> {
        let content_type =
            detect_content_type(&upload.name, &upload.data, upload.content_type.as_deref());
        let is_image = is_thumbnailable_mime(&content_type);

        let record = self
            .save_meta(NewFileMeta {
                id: file_id,
                path: file_bucket_path(&self.config.base_path, storage_id),
                name: sanitize_filename(&upload.name),
                tags,
                size: upload.size(),
                content_type: content_type.clone(),
                is_image,
            })
            .await?;

        self.objects
            .save(&record.path, &content_type, &upload.data)
            .await?;
        debug!(
            subsystem = "api",
            component = "file_service",
            file_id = %record.id,
            storage_path = %record.path,
            size = record.size,
            "blob stored"
        );

        if let Some(thumbnail_path) = record.thumbnail_path.as_deref() {
            let thumbnail = create_thumbnail(upload.data).await?;
            self.objects
                .save(thumbnail_path, thumbnail.content_type, &thumbnail.data)
                .await?;
            debug!(
                subsystem = "api",
                component = "file_service",
                file_id = %record.id,
                storage_path = %thumbnail_path,
                size = thumbnail.data.len(),
                "thumbnail stored"
            );
        }

        Ok(record)
    }

    /// Write metadata and return the record as the store now holds it.
    async fn save_meta(&self, fields: NewFileMeta) -> Result<FileRecord> {
        let file_id = fields.id;
        self.metadata.save(&FileMeta::new(fields)).await?;
        self.metadata
            .get_by_id(file_id)
            .await?
            .map(FileRecord::from)
            .ok_or(Error::FileNotFound(file_id))
    }

    async fn delete_blobs(&self, existing: &FileMeta) -> Result<()> {
        if !self.objects.exists(&existing.path).await? {
            warn!(
                subsystem = "api",
                component = "file_service",
                file_id = %existing.id,
                storage_path = %existing.path,
                "blob already missing for record"
            );
        }
        self.objects.delete(&existing.path).await?;
        if let Some(thumbnail_path) = existing.thumbnail_path() {
            self.objects.delete(&thumbnail_path).await?;
        }
        Ok(())
    }
}

async fn create_thumbnail(data: Vec<u8>) -> Result<Thumbnail> {
    tokio::task::spawn_blocking(move || generate_thumbnail(&data))
        .await
        .map_err(|e| Error::Internal(format!("Thumbnail task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use lds_db::{MemoryMetadataStore, MemoryObjectStore};

    fn service() -> (FileService, MemoryMetadataStore, MemoryObjectStore) {
        let metadata = MemoryMetadataStore::new();
        let objects = MemoryObjectStore::new();
        let service = FileService::new(
            Arc::new(metadata.clone()),
            Arc::new(objects.clone()),
            FileServiceConfig::default(),
        );
        (service, metadata, objects)
    }

    #[tokio::test]
    async fn test_first_upload_uses_id_as_storage_key() {
        let (service, _, _) = service();
        let records = service
            .upload_files(
                vec![FileUpload::new("a.txt", Some("text/plain".into()), b"abc".to_vec())],
                vec!["x".into()],
            )
            .await
            .unwrap();

        assert_eq!(records[0].path, format!("files/{}", records[0].id));
    }

    #[tokio::test]
    async fn test_upload_sanitizes_name() {
        let (service, _, _) = service();
        let records = service
            .upload_files(
                vec![FileUpload::new("../../secret.txt", None, b"abc".to_vec())],
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(records[0].name, "secret.txt");
    }

    #[tokio::test]
    async fn test_upload_empty_batch() {
        let (service, metadata, objects) = service();
        let records = service.upload_files(vec![], vec!["a".into()]).await.unwrap();
        assert!(records.is_empty());
        assert!(metadata.is_empty().await);
        assert!(objects.is_empty().await);
    }

    #[tokio::test]
    async fn test_mislabelled_image_gets_no_thumbnail() {
        let (service, _, objects) = service();
        let records = service
            .upload_files(
                vec![FileUpload::new(
                    "photo.png",
                    Some("image/png".into()),
                    b"this is text".to_vec(),
                )],
                vec![],
            )
            .await
            .unwrap();

        assert!(!records[0].is_image);
        assert!(records[0].thumbnail_path.is_none());
        assert_eq!(objects.len().await, 1);
    }

    #[tokio::test]
    async fn test_read_blob_returns_saved_content_type() {
        let (service, _, _) = service();
        let records = service
            .upload_files(
                vec![FileUpload::new("data.csv", Some("text/csv".into()), b"a,b\n1,2".to_vec())],
                vec![],
            )
            .await
            .unwrap();

        let stored = service.read_blob(&records[0].path).await.unwrap().unwrap();
        assert_eq!(stored.content_type, "text/csv");
        assert_eq!(stored.data, b"a,b\n1,2");
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_blob() {
        let (service, metadata, objects) = service();
        let records = service
            .upload_files(vec![FileUpload::new("a.txt", None, b"a".to_vec())], vec![])
            .await
            .unwrap();
        objects.delete(&records[0].path).await.unwrap();

        let meta = service.get_file(records[0].id).await.unwrap().unwrap();
        service.delete_file(&meta).await.unwrap();
        assert!(metadata.is_empty().await);
    }

    #[tokio::test]
    async fn test_read_blob_missing_is_none() {
        let (service, _, _) = service();
        assert!(service.read_blob("files/nothing").await.unwrap().is_none());
    }
}
