//! Data models for file records.
//!
//! `FileMeta` is the row the metadata store persists. `FileRecord` is the
//! JSON view returned to clients; it adds the derived thumbnail key.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage_path::thumbnail_path;

// =============================================================================
// METADATA
// =============================================================================

/// Persisted metadata for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Stable identifier; survives content replacement.
    pub id: Uuid,
    /// Current blob storage key.
    pub path: String,
    /// Original filename.
    pub name: String,
    /// Normalized tags, duplicates allowed.
    pub tags: Vec<String>,
    /// Content size in bytes.
    pub size: i64,
    /// Detected content type of the stored blob.
    pub content_type: String,
    pub is_image: bool,
    /// Sortable write-order key, refreshed on every save.
    pub order_no: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Fields the orchestrator supplies when saving metadata.
///
/// Timestamps and the order key are stamped by [`FileMeta::new`].
#[derive(Debug, Clone)]
pub struct NewFileMeta {
    pub id: Uuid,
    pub path: String,
    pub name: String,
    pub tags: Vec<String>,
    pub size: i64,
    pub content_type: String,
    pub is_image: bool,
}

impl FileMeta {
    /// Stamp a new metadata row with the current time.
    ///
    /// Stores keep the original `create_time` when the id already exists.
    pub fn new(fields: NewFileMeta) -> Self {
        let now = Utc::now();
        Self {
            order_no: next_order_no(now, fields.id),
            id: fields.id,
            path: fields.path,
            name: fields.name,
            tags: fields.tags,
            size: fields.size,
            content_type: fields.content_type,
            is_image: fields.is_image,
            create_time: now,
            update_time: now,
        }
    }

    /// Thumbnail key, present only for images.
    pub fn thumbnail_path(&self) -> Option<String> {
        self.is_image.then(|| thumbnail_path(&self.path))
    }
}

/// Last microsecond value handed out by [`next_order_no`].
static LAST_ORDER_MICROS: AtomicI64 = AtomicI64::new(0);

/// Build the sortable order key: zero-padded unix micros, then the id.
///
/// Lexicographic order equals write order; the id breaks ties.
pub fn order_no_at(at: DateTime<Utc>, id: Uuid) -> String {
    format_order_no(at.timestamp_micros().max(0), id)
}

/// Order key for a write happening at `now`.
///
/// Strictly increasing within one process, so writes made in sequence (the
/// files of one upload batch) keep their order even inside one clock tick.
/// Keys from different processes in the same microsecond tie-break on id.
fn next_order_no(now: DateTime<Utc>, id: Uuid) -> String {
    let now_micros = now.timestamp_micros().max(0);
    let previous = LAST_ORDER_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_micros.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    format_order_no(now_micros.max(previous + 1), id)
}

fn format_order_no(micros: i64, id: Uuid) -> String {
    format!("{:016}-{}", micros, id.as_hyphenated())
}

// =============================================================================
// BLOBS
// =============================================================================

/// Blob bytes with the content type they were saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

// =============================================================================
// API VIEW
// =============================================================================

/// File record as returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub path: String,
    pub thumbnail_path: Option<String>,
    pub name: String,
    pub tags: Vec<String>,
    pub size: i64,
    pub is_image: bool,
    pub order_no: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl From<FileMeta> for FileRecord {
    fn from(meta: FileMeta) -> Self {
        let thumbnail_path = meta.thumbnail_path();
        Self {
            id: meta.id,
            path: meta.path,
            thumbnail_path,
            name: meta.name,
            tags: meta.tags,
            size: meta.size,
            is_image: meta.is_image,
            order_no: meta.order_no,
            create_time: meta.create_time,
            update_time: meta.update_time,
        }
    }
}

/// Response body carrying a list of files.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FileListResponse {
    pub files: Vec<FileRecord>,
}

/// Response body carrying a single file.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FileResponse {
    pub file: FileRecord,
}

// =============================================================================
// UPLOADS AND QUERIES
// =============================================================================

/// One uploaded file payload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Original filename as sent by the client.
    pub name: String,
    /// Content type declared by the client, if any.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            data,
        }
    }

    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }
}

/// Tag search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    /// Match records carrying any of these tags; empty matches everything.
    pub tags: Vec<String>,
    /// Only return records written before this order key.
    pub order_no: Option<String>,
    /// Maximum number of records.
    pub limit: i64,
}

impl FileQuery {
    pub fn new(tags: Vec<String>, order_no: Option<String>, limit: i64) -> Self {
        Self {
            tags,
            order_no: order_no.filter(|o| !o.trim().is_empty()),
            limit,
        }
    }

    /// Returns true if the record passes the tag and order filters.
    ///
    /// Stores that cannot push the filter down (the in-memory store) use
    /// this directly; the PostgreSQL store mirrors it in SQL.
    pub fn matches(&self, meta: &FileMeta) -> bool {
        let tag_match = self.tags.is_empty() || self.tags.iter().any(|t| meta.tags.contains(t));
        let order_match = self
            .order_no
            .as_deref()
            .map_or(true, |bound| meta.order_no.as_str() < bound);
        tag_match && order_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_meta(is_image: bool) -> FileMeta {
        FileMeta::new(NewFileMeta {
            id: Uuid::new_v4(),
            path: "files/abc".to_string(),
            name: "cat.png".to_string(),
            tags: vec!["cat".to_string(), "pet".to_string()],
            size: 42,
            content_type: "image/png".to_string(),
            is_image,
        })
    }

    #[test]
    fn test_new_stamps_times_and_order() {
        let meta = sample_meta(true);
        assert_eq!(meta.create_time, meta.update_time);
        assert!(meta.order_no.ends_with(&meta.id.to_string()));
    }

    #[test]
    fn test_thumbnail_only_for_images() {
        assert_eq!(
            sample_meta(true).thumbnail_path().as_deref(),
            Some("files/abc_small")
        );
        assert!(sample_meta(false).thumbnail_path().is_none());
    }

    #[test]
    fn test_order_no_sorts_by_time() {
        let id = Uuid::new_v4();
        let early = order_no_at(Utc.timestamp_millis_opt(1_000).unwrap(), id);
        let late = order_no_at(Utc.timestamp_millis_opt(2_000_000_000_000).unwrap(), id);
        assert!(early < late);
        assert!(early.starts_with("0000000001000000-"));
    }

    #[test]
    fn test_sequential_saves_get_increasing_order_keys() {
        let metas: Vec<FileMeta> = (0..200).map(|_| sample_meta(false)).collect();
        assert!(metas.windows(2).all(|w| w[0].order_no < w[1].order_no));
    }

    #[test]
    fn test_record_json_shape() {
        let record = FileRecord::from(sample_meta(true));
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "id",
            "path",
            "thumbnailPath",
            "name",
            "tags",
            "size",
            "isImage",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["thumbnailPath"], "files/abc_small");
        assert_eq!(json["isImage"], true);
    }

    #[test]
    fn test_non_image_record_has_null_thumbnail() {
        let json = serde_json::to_value(FileRecord::from(sample_meta(false))).unwrap();
        assert!(json["thumbnailPath"].is_null());
    }

    #[test]
    fn test_query_matches_any_tag() {
        let meta = sample_meta(false);
        assert!(FileQuery::new(vec![], None, 10).matches(&meta));
        assert!(FileQuery::new(vec!["dog".into(), "pet".into()], None, 10).matches(&meta));
        assert!(!FileQuery::new(vec!["dog".into()], None, 10).matches(&meta));
    }

    #[test]
    fn test_query_order_bound_is_exclusive() {
        let meta = sample_meta(false);
        let at = FileQuery::new(vec![], Some(meta.order_no.clone()), 10);
        assert!(!at.matches(&meta));

        let after = FileQuery::new(vec![], Some(format!("{}~", meta.order_no)), 10);
        assert!(after.matches(&meta));
    }

    #[test]
    fn test_query_blank_order_no_is_ignored() {
        let query = FileQuery::new(vec![], Some("  ".into()), 5);
        assert!(query.order_no.is_none());
    }

    #[test]
    fn test_upload_size() {
        let upload = FileUpload::new("a.txt", None, vec![0; 17]);
        assert_eq!(upload.size(), 17);
    }
}
