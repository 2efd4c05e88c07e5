use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::login::LoginError;
use crate::media::MediaError;
use crate::store::{StoreError, UserId};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Administrators cannot delete their own account")]
    CannotDeleteSelf,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Record store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AdminError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UserNotFound(id) => AdminError::UserNotFound(id),
            StoreError::Conflict(_) | StoreError::AlreadyInitialized => {
                AdminError::Login(e.into())
            }
            other => AdminError::Store(other),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::CannotDeleteSelf => {
                (StatusCode::FORBIDDEN, self.to_string()).into_response()
            }
            AdminError::UserNotFound(_) => {
                (StatusCode::NOT_FOUND, "User not found").into_response()
            }
            AdminError::Login(e) => e.into_response(),
            AdminError::Media(e) => e.into_response(),
            AdminError::Store(e) => {
                error!("Admin request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
            }
        }
    }
}
