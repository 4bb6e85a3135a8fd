//! Error types for the lookup engine and its collaborators.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use super::models::DictId;

/// Failure reported by an [`EntrySource`](crate::engine::source::EntrySource).
///
/// Kept separate from [`EngineError`] so adapters over real container
/// decoders do not need to know about engine-level failures.
#[derive(Debug, Error)]
pub enum SourceError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is structurally invalid or uses an unsupported feature.
    #[error("Invalid container format: {0}")]
    InvalidFormat(String),
}

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The trimmed lookup query was empty.
    #[error("Please enter a word.")]
    EmptyQuery,

    /// No dictionary with this id is registered in the catalog.
    #[error("Dictionary not found: {0}")]
    DictionaryNotFound(DictId),

    /// The dictionary is registered but its headword file is gone from disk.
    #[error("Headword file missing on server: {}", .0.display())]
    SourceFileMissing(PathBuf),

    /// The decoding adapter failed while enumerating a container.
    /// Failed builds are never cached.
    #[error("Failed to decode {}: {source}", path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: Arc<SourceError>,
    },

    /// Neither the extracted files nor any packed-asset container hold the asset.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The requested asset path escapes the dictionary folder.
    #[error("Invalid asset path: {0}")]
    PathTraversalRejected(String),

    /// The uploaded archive contains an absolute or parent-relative entry.
    #[error("Archive contains unsafe path: {0}")]
    ArchiveUnsafe(String),

    /// The extracted archive does not contain exactly one headword file.
    #[error("Archive must contain exactly one .mdx file, found {found}")]
    ArchiveShapeInvalid { found: usize },

    /// The display name given for an installation is too short.
    #[error("Dictionary name is too short (minimum {min} characters)")]
    NameTooShort { min: usize },

    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded bytes are not a readable zip archive.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The engine configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A lock was poisoned, indicating a panic in another thread holding it.
    #[error("A lock was poisoned, indicating a panic in another thread holding it.")]
    LockPoisoned,
}

impl EngineError {
    /// Whether this failure should surface as a "not found" response
    /// rather than an error page.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::DictionaryNotFound(_)
                | EngineError::AssetNotFound(_)
                | EngineError::SourceFileMissing(_)
        )
    }
}

/// A convenience `Result` type alias using the crate's `EngineError` type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// `Result` alias for decoding adapters.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
