use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::{User, UserId};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of both signup forms and of the admin "create user" form.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub photo_dir: String,
    #[serde(default)]
    pub video_dir: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), super::LoginError> {
        if self.username.trim().is_empty() {
            return Err(super::LoginError::InvalidInput(
                "username must not be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(super::LoginError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn photo_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.photo_dir)
    }

    pub fn video_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.video_dir)
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for SessionInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}
