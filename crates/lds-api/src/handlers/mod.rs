//! HTTP handlers for lds-api.

pub mod blobs;
pub mod files;
pub mod health;
