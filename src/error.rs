use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Formula not found: {0}")]
    FormulaNotFound(String),

    /// Malformed invocation; the message is shown above the usage text.
    #[error("{0}")]
    Usage(String),

    /// A source build failed, either as the chosen strategy or as the
    /// fallback after a failed bottle pour. Never retried.
    #[error("Source bottle build failed: {0}")]
    SourceBuildFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StackError>;
