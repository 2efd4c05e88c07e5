use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::public_upload::UploadError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid path")]
    InvalidPath,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Not configured: {0}")]
    Unconfigured(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Record store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Public upload failed: {0}")]
    UploadError(#[from] UploadError),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Multipart error: {0}")]
    MultipartError(String),

    #[error("Background task failed: {0}")]
    TaskError(String),
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MediaError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            MediaError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            MediaError::InvalidPath => (StatusCode::BAD_REQUEST, "Invalid path".to_string()),
            MediaError::UnsupportedType(_) | MediaError::MultipartError(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            MediaError::Unconfigured(_) => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            MediaError::UploadError(e) => {
                error!("Public upload failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to upload image to public service.".to_string(),
                )
            }
            MediaError::ImageError(e) => {
                error!("Could not read image metadata: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not read file metadata.".to_string(),
                )
            }
            MediaError::IoError(_) | MediaError::StoreError(_) | MediaError::TaskError(_) => {
                error!("Media request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
