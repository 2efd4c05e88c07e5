use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::StoreError;

pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_dir: Option<PathBuf>,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn directories(&self) -> UserDirectories {
        UserDirectories {
            photo_dir: self.photo_dir.clone(),
            video_dir: self.video_dir.clone(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            photo_dir: self.photo_dir.clone(),
            video_dir: self.video_dir.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// The two filesystem roots a user's media lives under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectories {
    pub photo_dir: Option<PathBuf>,
    pub video_dir: Option<PathBuf>,
}

impl UserDirectories {
    pub fn is_configured(&self) -> bool {
        self.photo_dir.is_some() || self.video_dir.is_some()
    }
}

/// A user as exposed outside the store, without the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub photo_dir: Option<PathBuf>,
    pub video_dir: Option<PathBuf>,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub photo_dir: Option<PathBuf>,
    pub video_dir: Option<PathBuf>,
    pub is_admin: bool,
}

/// On-disk shape of the record store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordDatabase {
    #[serde(default)]
    pub last_id: UserId,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl RecordDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn insert_user(&mut self, new_user: NewUser) -> Result<User, StoreError> {
        if self.user_by_name(&new_user.username).is_some() {
            return Err(StoreError::Conflict(new_user.username));
        }

        // Ids are never reused, even after deletions.
        let id = self.last_id.max(self.users.iter().map(|u| u.id).max().unwrap_or(0)) + 1;
        self.last_id = id;

        let user = User {
            id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            photo_dir: new_user.photo_dir,
            video_dir: new_user.video_dir,
            is_admin: new_user.is_admin,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn remove_user(&mut self, id: UserId) -> Option<User> {
        let index = self.users.iter().position(|u| u.id == id)?;
        Some(self.users.remove(index))
    }
}
