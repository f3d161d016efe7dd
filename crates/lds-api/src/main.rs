//! lds-api - HTTP API server for the LDS file service.

use std::net::SocketAddr;
use std::sync::Arc;

use lds_api::{router, AppConfig, AppState, FileService, MetadataBackendKind, StorageBackendKind};
use lds_core::{MetadataStore, ObjectStore};
use lds_db::{
    log_pool_metrics, Database, FilesystemBackend, MemoryMetadataStore, MemoryObjectStore,
    PoolConfig,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "lds_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lds_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("lds-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            // no ANSI in files unless asked
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = AppConfig::from_env()?;

    let metadata: Arc<dyn MetadataStore> = match config.metadata_backend {
        MetadataBackendKind::Postgres => {
            let pool_config = PoolConfig::default().max_connections(config.db_max_connections);
            let db = Database::connect_with_config(&config.database_url, pool_config).await?;
            db.migrate().await?;
            log_pool_metrics(db.pool());
            info!(subsystem = "database", "Connected to database, migrations applied");
            Arc::new(db.files)
        }
        MetadataBackendKind::Memory => {
            warn!(subsystem = "database", "Using in-memory metadata store; records are lost on restart");
            Arc::new(MemoryMetadataStore::new())
        }
    };

    let objects: Arc<dyn ObjectStore> = match config.storage_backend {
        StorageBackendKind::Filesystem => {
            let backend = FilesystemBackend::new(&config.file_storage_path);
            backend.validate().await.map_err(anyhow::Error::msg)?;
            info!(
                subsystem = "storage",
                path = %config.file_storage_path,
                "Filesystem object store ready"
            );
            Arc::new(backend)
        }
        StorageBackendKind::Memory => {
            warn!(subsystem = "storage", "Using in-memory object store; blobs are lost on restart");
            Arc::new(MemoryObjectStore::new())
        }
    };

    let state = AppState::new(FileService::new(metadata, objects, config.files.clone()));
    let app = router(state, config.max_upload_bytes);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        max_upload_bytes = config.max_upload_bytes,
        base_path = %config.files.base_path,
        "Starting server on {}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
