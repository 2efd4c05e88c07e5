use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Public host configuration error: {0}")]
    ConfigError(String),

    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Public host returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Public host rejected the upload: {0}")]
    Rejected(String),

    #[error("Unexpected response from public host: {0}")]
    InvalidResponse(String),
}
