use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid namespace {0:?}: use ASCII letters, digits, '-' or '_'")]
    InvalidNamespace(String),

    #[error("namespace {0} mounted twice")]
    DuplicateNamespace(String),

    #[error("mount {namespace} at {}: {source}", path.display())]
    Registry {
        namespace: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
