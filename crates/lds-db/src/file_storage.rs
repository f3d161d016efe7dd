//! Filesystem object store.
//!
//! Stores each blob as a file at `{root}/{key}`, with the content type it
//! was saved under in a sidecar `{root}/{key}.content-type`:
//! - Atomic writes (temp file + rename)
//! - 0644 permissions, never executable
//! - Key validation so no key escapes the root
//!
//! ## Example
//!
//! ```rust,ignore
//! use lds_db::FilesystemBackend;
//!
//! let backend = FilesystemBackend::new("/var/lib/lds/files");
//! backend.validate().await?;
//! backend.save("files/0194...", "image/png", &bytes).await?;
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lds_core::{
    detect_content_type, validate_storage_key, Error, ObjectStore, Result, StoredObject,
};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Suffix of the file holding a blob's content type.
const CONTENT_TYPE_SUFFIX: &str = ".content-type";

/// Suffix of in-flight writes.
const TEMP_SUFFIX: &str = ".tmp";

/// Filesystem storage backend.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given root directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    fn full_path(&self, key: &str) -> Result<PathBuf> {
        validate_storage_key(key)?;
        if key.ends_with(CONTENT_TYPE_SUFFIX) || key.ends_with(TEMP_SUFFIX) {
            return Err(Error::InvalidInput(format!(
                "Reserved storage key suffix: {}",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }

    /// Validate that the storage backend can write, read, and delete files.
    ///
    /// Performs a full round-trip test at startup to catch filesystem issues
    /// (permission errors, missing directories) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await; // Best-effort cleanup

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemBackend {
    async fn save(&self, key: &str, content_type: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(key)?;
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "save",
            storage_path = %key,
            content_type = %content_type,
            size = data.len(),
            "object_store: write"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "object_store: create_dir_all failed");
                e
            })?;
        }

        // Sidecar first: a visible blob always has its content type
        write_atomic(&sidecar_path(&full_path), content_type.as_bytes()).await?;
        write_atomic(&full_path, data).await
    }

    async fn read(&self, key: &str) -> Result<Option<StoredObject>> {
        let full_path = self.full_path(key)?;
        let data = match fs::read(&full_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let content_type = match fs::read_to_string(sidecar_path(&full_path)).await {
            Ok(content_type) if !content_type.trim().is_empty() => content_type.trim().to_string(),
            Ok(_) => detect_content_type(key, &data, None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(storage_path = %key, "object_store: content type sidecar missing");
                detect_content_type(key, &data, None)
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(StoredObject { content_type, data }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.full_path(key)?;
        remove_if_present(&full_path).await?;
        remove_if_present(&sidecar_path(&full_path)).await?;
        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "delete",
            storage_path = %key,
            "object_store: deleted"
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let full_path = self.full_path(key)?;
        Ok(fs::try_exists(&full_path).await? && fs::metadata(&full_path).await?.is_file())
    }

    async fn batch_delete(&self) -> Result<u64> {
        if !fs::try_exists(&self.base_path).await? {
            return Ok(0);
        }

        let mut removed = 0u64;
        let mut pending = vec![self.base_path.clone()];
        let mut dirs = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path.clone());
                    dirs.push(path);
                } else {
                    fs::remove_file(&path).await?;
                    if !is_auxiliary_file(&path) {
                        removed += 1;
                    }
                }
            }
        }

        // Deepest directories first so each is empty when removed
        dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        for dir in dirs {
            if let Err(e) = fs::remove_dir(&dir).await {
                warn!(dir = %dir.display(), error = %e, "object_store: remove_dir failed");
            }
        }

        debug!(
            subsystem = "storage",
            component = "filesystem",
            op = "batch_delete",
            result_count = removed,
            "object_store: wiped"
        );
        Ok(removed)
    }
}

fn sidecar_path(full_path: &Path) -> PathBuf {
    let mut name = OsString::from(full_path.as_os_str());
    name.push(CONTENT_TYPE_SUFFIX);
    PathBuf::from(name)
}

fn is_auxiliary_file(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|p| p.ends_with(CONTENT_TYPE_SUFFIX) || p.ends_with(TEMP_SUFFIX))
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Write via temp file + rename so readers never see a partial file.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let mut temp_name = OsString::from(path.as_os_str());
    temp_name.push(TEMP_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    let mut file = fs::File::create(&temp_path).await.map_err(|e| {
        warn!(temp_path = %temp_path.display(), error = %e, "object_store: File::create failed");
        e
    })?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp_path, path).await.map_err(|e| {
        warn!(from = %temp_path.display(), to = %path.display(), error = %e, "object_store: rename failed");
        e
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).await?;
    }

    Ok(())
}
