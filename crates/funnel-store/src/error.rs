use std::io;
use std::path::PathBuf;

/// Underlying cause of a failed record read or write.
#[derive(Debug, thiserror::Error)]
pub enum CodecCause {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from store operations.
///
/// A missing file on a read or delete path is never an error; it surfaces as
/// `Ok(None)` / `Ok(false)`. The variants here cover the unexpected cases.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record was required by the caller but does not exist.
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    /// An entity creation or export named a project that does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// Reading or decoding a record file failed.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: CodecCause,
    },

    /// Encoding or writing a record file failed.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: CodecCause,
    },

    /// Removing a record file failed for a reason other than absence.
    #[error("failed to delete {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A payload or identifier was rejected before touching the disk.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The storage directories could not be created or the configuration
    /// could not be loaded.
    #[error("storage setup failed at {path}: {reason}")]
    Setup { path: PathBuf, reason: String },
}

/// Coarse classification of a [`StoreError`], for callers that branch on the
/// kind of failure rather than its details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    NotFound,
    ProjectNotFound,
    ReadFailed,
    WriteFailed,
    DeleteFailed,
    InvalidData,
    Setup,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::ProjectNotFound(_) => StoreErrorKind::ProjectNotFound,
            Self::ReadFailed { .. } => StoreErrorKind::ReadFailed,
            Self::WriteFailed { .. } => StoreErrorKind::WriteFailed,
            Self::DeleteFailed { .. } => StoreErrorKind::DeleteFailed,
            Self::InvalidData(_) => StoreErrorKind::InvalidData,
            Self::Setup { .. } => StoreErrorKind::Setup,
        }
    }

    /// Returns `true` for the expected "nothing there" outcomes that a
    /// boundary reports as a structured failure rather than a crash.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            StoreErrorKind::NotFound | StoreErrorKind::ProjectNotFound
        )
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
