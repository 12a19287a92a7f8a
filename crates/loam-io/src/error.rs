use thiserror::Error;

/// Failures while reading or writing an edit table.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem access failed.
    #[error("failed to access edit table: {0}")]
    Io(#[from] std::io::Error),
    /// The document was not valid JSON.
    #[error("failed to parse edit table: {0}")]
    Json(#[from] serde_json::Error),
    /// Valid JSON but not an edit table.
    #[error("invalid edit table: {0}")]
    Invalid(String),
}
