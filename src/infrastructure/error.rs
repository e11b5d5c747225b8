use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Credential error: {0}")]
    Credential(String),
    #[error("authentication required")]
    MissingCredential,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Remote store rejected request: {0}")]
    Remote(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("{0} not found")]
    NotFound(String),
}
