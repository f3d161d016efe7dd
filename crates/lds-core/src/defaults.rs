//! Centralized default constants for the LDS file service.
//!
//! **This module is the single source of truth** for shared default values.
//! The database and API crates reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// THUMBNAILS
// =============================================================================

/// Thumbnail width in pixels. Thumbnails are stretched, not letterboxed.
pub const THUMBNAIL_WIDTH: u32 = 300;

/// Thumbnail height in pixels.
pub const THUMBNAIL_HEIGHT: u32 = 300;

/// Suffix appended to a file's storage key to form its thumbnail key.
pub const THUMBNAIL_SUFFIX: &str = "_small";

// =============================================================================
// STORAGE
// =============================================================================

/// Default prefix for blob storage keys.
pub const RESOURCE_BASE_PATH: &str = "files";

/// Default root directory for the filesystem object store.
pub const FILE_STORAGE_PATH: &str = "/var/lib/lds/files";

/// Maximum accepted request body size (32 MiB).
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Fallback filename for multipart parts that carry none.
pub const UNNAMED_FILE: &str = "unnamed_file";

// =============================================================================
// SEARCH
// =============================================================================

/// Default number of records returned by a tag search.
pub const SEARCH_PAGE_SIZE: i64 = 50;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 3000;

/// Default PostgreSQL connection URL.
pub const DATABASE_URL: &str = "postgres://localhost/lds";

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_METADATA_BACKEND: &str = "METADATA_BACKEND";
pub const ENV_STORAGE_BACKEND: &str = "STORAGE_BACKEND";
pub const ENV_FILE_STORAGE_PATH: &str = "FILE_STORAGE_PATH";
pub const ENV_RESOURCE_BASE_PATH: &str = "RESOURCE_BASE_PATH";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_is_square() {
        assert_eq!(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT);
        assert_eq!(THUMBNAIL_WIDTH, 300);
    }

    #[test]
    fn test_upload_limit_is_32_mib() {
        assert_eq!(MAX_UPLOAD_BYTES, 33_554_432);
    }
}
