//! Environment-driven server configuration.
//!
//! Environment variables (loaded after `dotenvy::dotenv()`):
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `DATABASE_URL` | `postgres://localhost/lds` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `METADATA_BACKEND` | `postgres` (`memory` for local runs) |
//! | `STORAGE_BACKEND` | `filesystem` (`memory` for local runs) |
//! | `FILE_STORAGE_PATH` | `/var/lib/lds/files` |
//! | `RESOURCE_BASE_PATH` | `files` |
//! | `MAX_UPLOAD_BYTES` | `33554432` |

use std::str::FromStr;

use lds_core::defaults;
use lds_core::{Error, Result};

/// Where file metadata is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBackendKind {
    Postgres,
    Memory,
}

impl FromStr for MetadataBackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "Unknown {}: {}",
                defaults::ENV_METADATA_BACKEND,
                other
            ))),
        }
    }
}

/// Where blob bytes are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Filesystem,
    Memory,
}

impl FromStr for StorageBackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "filesystem" | "fs" => Ok(Self::Filesystem),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "Unknown {}: {}",
                defaults::ENV_STORAGE_BACKEND,
                other
            ))),
        }
    }
}

/// Settings injected into the file orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileServiceConfig {
    /// Prefix for every blob storage key.
    pub base_path: String,
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            base_path: defaults::RESOURCE_BASE_PATH.to_string(),
        }
    }
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub metadata_backend: MetadataBackendKind,
    pub storage_backend: StorageBackendKind,
    pub file_storage_path: String,
    pub max_upload_bytes: usize,
    pub files: FileServiceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            db_max_connections: lds_db::pool::DEFAULT_MAX_CONNECTIONS,
            metadata_backend: MetadataBackendKind::Postgres,
            storage_backend: StorageBackendKind::Filesystem,
            file_storage_path: defaults::FILE_STORAGE_PATH.to_string(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            files: FileServiceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset or blank keys fall back to defaults; malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let base = Self::default();

        Ok(Self {
            host: get(defaults::ENV_HOST).unwrap_or(base.host),
            port: parse_or(get(defaults::ENV_PORT), defaults::ENV_PORT, base.port)?,
            database_url: get(defaults::ENV_DATABASE_URL).unwrap_or(base.database_url),
            db_max_connections: parse_or(
                get(defaults::ENV_DB_MAX_CONNECTIONS),
                defaults::ENV_DB_MAX_CONNECTIONS,
                base.db_max_connections,
            )?,
            metadata_backend: parse_or(
                get(defaults::ENV_METADATA_BACKEND),
                defaults::ENV_METADATA_BACKEND,
                base.metadata_backend,
            )?,
            storage_backend: parse_or(
                get(defaults::ENV_STORAGE_BACKEND),
                defaults::ENV_STORAGE_BACKEND,
                base.storage_backend,
            )?,
            file_storage_path: get(defaults::ENV_FILE_STORAGE_PATH)
                .unwrap_or(base.file_storage_path),
            max_upload_bytes: parse_or(
                get(defaults::ENV_MAX_UPLOAD_BYTES),
                defaults::ENV_MAX_UPLOAD_BYTES,
                base.max_upload_bytes,
            )?,
            files: FileServiceConfig {
                base_path: get(defaults::ENV_RESOURCE_BASE_PATH)
                    .map(|p| p.trim_matches('/').to_string())
                    .unwrap_or(base.files.base_path),
            },
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}={}: {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.metadata_backend, MetadataBackendKind::Postgres);
        assert_eq!(config.storage_backend, StorageBackendKind::Filesystem);
        assert_eq!(config.files.base_path, "files");
        assert_eq!(config.max_upload_bytes, 32 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("METADATA_BACKEND", "memory"),
            ("STORAGE_BACKEND", "Memory"),
            ("RESOURCE_BASE_PATH", "/uploads/"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.metadata_backend, MetadataBackendKind::Memory);
        assert_eq!(config.storage_backend, StorageBackendKind::Memory);
        assert_eq!(config.files.base_path, "uploads");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("PORT", "  ")])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "s3")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
