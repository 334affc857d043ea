//! Screenshot gallery: records, the storage capability, and exports.
//!
//! Persistence is deliberately a flat JSON blob (one self-contained document)
//! rather than a real storage engine. The [`GalleryStore`] trait has two
//! implementations chosen at startup: a file-backed store when a data
//! directory resolves, and an in-memory store otherwise.

pub mod export;
pub mod record;
pub mod store;

pub use record::{Screenshot, generate_name};
pub use store::{GalleryStore, JsonFileStore, MemoryStore, resolve_id};

use thiserror::Error;

/// Errors from gallery persistence and export.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gallery blob is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no screenshot matches '{0}'")]
    NotFound(String),

    #[error("'{0}' matches more than one screenshot")]
    Ambiguous(String),

    #[error("ZIP export failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("the gallery is empty")]
    Empty,
}
