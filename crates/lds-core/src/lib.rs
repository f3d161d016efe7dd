//! # lds-core
//!
//! Core types, traits, and abstractions for the LDS file service.
//!
//! This crate provides the file metadata model, the store traits the
//! orchestrator is written against, and the small pure helpers (tag
//! normalization, storage key layout, image classification) shared by the
//! database and API crates.

pub mod defaults;
pub mod error;
pub mod file_type;
pub mod models;
pub mod storage_path;
pub mod tags;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use file_type::{detect_content_type, is_thumbnailable_mime, sanitize_filename};
pub use models::*;
pub use storage_path::{file_bucket_path, thumbnail_path, validate_storage_key};
pub use tags::normalize_tags;
pub use traits::*;
