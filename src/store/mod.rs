// Record store - users and settings
mod error;
mod toml_store;
mod types;

pub use error::StoreError;
pub use toml_store::TomlRecordStore;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Persistence for user accounts and key/value settings.
///
/// Implementations must make `create_user` and `bootstrap_admin` atomic with
/// respect to each other, so two concurrent signups can never end up with the
/// same username or with two bootstrap admins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn get_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// `None` when the user does not exist.
    async fn get_user_directories(
        &self,
        id: UserId,
    ) -> Result<Option<UserDirectories>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn count_users(&self) -> Result<usize, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Creates the first account as an admin. Fails with
    /// [`StoreError::AlreadyInitialized`] once any user exists.
    async fn bootstrap_admin(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Returns whether a user was removed.
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;

    async fn update_password(&self, id: UserId, password_hash: String) -> Result<(), StoreError>;

    async fn update_admin_flag(&self, id: UserId, is_admin: bool) -> Result<(), StoreError>;

    async fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub type DynRecordStore = Arc<dyn RecordStore>;
