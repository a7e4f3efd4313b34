use thiserror::Error;

/// Errors raised by the model store and the prediction input path.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No usable model on disk: one or both artifacts are missing.
    #[error("model not trained: {0}")]
    NotTrained(String),

    /// Artifacts exist but cannot be parsed, or fail structural validation.
    #[error("corrupt model artifact: {0}")]
    Corrupt(String),

    /// A prediction record is missing a feature or carries a non-numeric value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem failure other than a missing artifact.
    #[error("model store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact serialization failure.
    #[error("model serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
