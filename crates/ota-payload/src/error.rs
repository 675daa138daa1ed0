use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("read {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("unsupported part type: {0}")]
    UnsupportedPartType(String),

    #[error("unknown update endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type PayloadResult<T> = Result<T, PayloadError>;
