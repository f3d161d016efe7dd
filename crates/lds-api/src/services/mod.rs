//! Service layer for lds-api.
//!
//! Contains the file orchestrator and the thumbnail generator it drives.

pub mod file_service;
pub mod thumbnail;

pub use file_service::FileService;
pub use thumbnail::{generate_thumbnail, Thumbnail};
