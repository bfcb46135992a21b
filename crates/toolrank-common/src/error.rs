use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolrankError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Signal source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ToolrankError>;
