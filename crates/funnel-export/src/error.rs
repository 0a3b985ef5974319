use funnel_store::StoreError;

/// Errors from export operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExportError {
    /// Returns `true` if the export named a project that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }

    /// Returns `true` if the request itself was rejected, e.g. an unknown
    /// export format.
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Self::Store(StoreError::InvalidData(_)))
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
