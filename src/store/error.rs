use super::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already exists: {0}")]
    Conflict(String),

    #[error("Users already exist; first-admin signup is closed")]
    AlreadyInitialized,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database parse error: {0}")]
    ParseError(String),

    #[error("Database serialization error: {0}")]
    SerializeError(String),
}
