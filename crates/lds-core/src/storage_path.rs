//! Blob storage key layout.
//!
//! Key format: `{base_path}/{uuid}` for file content and
//! `{base_path}/{uuid}_small` for its thumbnail. The uuid is the record id on
//! first upload and a freshly minted one each time the content is replaced,
//! so a replacement never overwrites a blob another request may still read.

use uuid::Uuid;

use crate::defaults::THUMBNAIL_SUFFIX;
use crate::error::{Error, Result};

/// Build the storage key for a blob id under the configured base path.
///
/// Leading and trailing slashes on `base_path` are ignored; an empty base
/// path places blobs at the store root.
pub fn file_bucket_path(base_path: &str, blob_id: Uuid) -> String {
    let base = base_path.trim_matches('/');
    if base.is_empty() {
        blob_id.as_hyphenated().to_string()
    } else {
        format!("{}/{}", base, blob_id.as_hyphenated())
    }
}

/// Derive the thumbnail key from a file's storage key.
pub fn thumbnail_path(path: &str) -> String {
    format!("{}{}", path, THUMBNAIL_SUFFIX)
}

/// Reject keys that could escape the store root.
///
/// Keys must be non-empty, relative, and contain no `.`/`..` or empty
/// segments.
pub fn validate_storage_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("Storage key cannot be empty".to_string()));
    }
    if key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Err(Error::InvalidInput(format!("Invalid storage key: {}", key)));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(Error::InvalidInput(format!("Invalid storage key: {}", key)));
    }
    Ok(())
}
