use thiserror::Error;

/// Invalid run configuration. Raised before any measurement starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input length must be positive")]
    ZeroLength,
    #[error("alphabet must contain at least one character")]
    EmptyAlphabet,
    #[error("unknown variant `{0}`")]
    UnknownVariant(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
