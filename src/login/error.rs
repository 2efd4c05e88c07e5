use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug)]
pub enum LoginError {
    InvalidCredentials,
    NotAuthenticated,
    Forbidden,
    UsernameTaken(String),
    AlreadyInitialized,
    InvalidInput(String),
    UserNotFound,
    DatabaseError(String),
    InternalError(String),
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::InvalidCredentials => write!(f, "Invalid credentials"),
            LoginError::NotAuthenticated => write!(f, "Not signed in"),
            LoginError::Forbidden => write!(f, "Forbidden"),
            LoginError::UsernameTaken(name) => write!(f, "Username already exists: {}", name),
            LoginError::AlreadyInitialized => write!(f, "An administrator already exists"),
            LoginError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            LoginError::UserNotFound => write!(f, "User not found"),
            LoginError::DatabaseError(e) => write!(f, "Database error: {}", e),
            LoginError::InternalError(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for LoginError {}

impl From<StoreError> for LoginError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(name) => LoginError::UsernameTaken(name),
            StoreError::AlreadyInitialized => LoginError::AlreadyInitialized,
            StoreError::UserNotFound(_) => LoginError::UserNotFound,
            other => LoginError::DatabaseError(other.to_string()),
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LoginError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials."),
            LoginError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Login required"),
            LoginError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            LoginError::UsernameTaken(_) => (StatusCode::CONFLICT, "Username already exists."),
            LoginError::AlreadyInitialized => {
                (StatusCode::CONFLICT, "An administrator already exists")
            }
            LoginError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
            LoginError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            LoginError::DatabaseError(e) => {
                error!("Record store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            LoginError::InternalError(e) => {
                error!("Internal login error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
