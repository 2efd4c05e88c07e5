use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use super::{
    NewUser, RecordDatabase, RecordStore, StoreError, User, UserDirectories, UserId,
};

impl RecordDatabase {
    pub async fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).await?;
        let doc = contents
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| StoreError::ParseError(e.to_string()))?;

        let db: RecordDatabase = toml_edit::de::from_document(doc)
            .map_err(|e| StoreError::ParseError(e.to_string()))?;
        Ok(db)
    }

    pub async fn save_to_file(&self, path: &Path) -> Result<(), StoreError> {
        let value = toml_edit::ser::to_document(self)
            .map_err(|e| StoreError::SerializeError(e.to_string()))?;

        // Written beside the target and renamed so readers never see half a file.
        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, value.to_string()).await?;
        fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

/// Modification time and length of the database file as last seen.
type FileStamp = (SystemTime, u64);

async fn file_stamp(path: &Path) -> Option<FileStamp> {
    let metadata = fs::metadata(path).await.ok()?;
    Some((metadata.modified().ok()?, metadata.len()))
}

/// A [`RecordStore`] kept in memory and written through to a single TOML file.
///
/// Every mutation takes the write lock, applies the change to a copy, persists
/// the copy and only then swaps it in. A failed save leaves the in-memory
/// state untouched.
///
/// Edits made to the file by another process (the `user` CLI) are picked up
/// by [`TomlRecordStore::reload_if_changed`].
#[derive(Debug, Clone)]
pub struct TomlRecordStore {
    database: Arc<RwLock<RecordDatabase>>,
    stamp: Arc<Mutex<Option<FileStamp>>>,
    file_path: PathBuf,
}

impl TomlRecordStore {
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let database = if path.exists() {
            let db = RecordDatabase::load_from_file(&path).await?;
            info!(
                "Loaded record store from {:?} ({} users, {} settings)",
                path,
                db.users.len(),
                db.settings.len()
            );
            db
        } else {
            info!("Record store {:?} does not exist yet, starting empty", path);
            RecordDatabase::new()
        };

        Ok(Self {
            database: Arc::new(RwLock::new(database)),
            stamp: Arc::new(Mutex::new(file_stamp(&path).await)),
            file_path: path,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Reloads the file when its mtime or length differs from the last load
    /// or save. A missing file keeps the in-memory records. Returns whether a
    /// reload happened.
    pub async fn reload_if_changed(&self) -> Result<bool, StoreError> {
        let mut db = self.database.write().await;
        let mut stamp = self.stamp.lock().await;

        let current = file_stamp(&self.file_path).await;
        if current.is_none() || current == *stamp {
            return Ok(false);
        }

        // Recorded before parsing so a broken edit is reported once.
        *stamp = current;
        *db = RecordDatabase::load_from_file(&self.file_path).await?;
        info!(
            "Reloaded record store from {:?} ({} users)",
            self.file_path,
            db.users.len()
        );
        Ok(true)
    }

    pub fn start_background_reload(store: Arc<Self>, interval_seconds: u64) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));
            interval.tick().await; // Skip the first immediate tick

            loop {
                interval.tick().await;
                if let Err(e) = store.reload_if_changed().await {
                    error!("Failed to reload record store {:?}: {}", store.file_path, e);
                }
            }
        });
    }

    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut RecordDatabase) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut db = self.database.write().await;
        let mut next = db.clone();
        let result = change(&mut next)?;
        next.save_to_file(&self.file_path).await?;
        *db = next;
        *self.stamp.lock().await = file_stamp(&self.file_path).await;
        debug!("Record store saved to {:?}", self.file_path);
        Ok(result)
    }
}

#[async_trait]
impl RecordStore for TomlRecordStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.database.read().await.user(id).cloned())
    }

    async fn get_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.database.read().await.user_by_name(username).cloned())
    }

    async fn get_user_directories(
        &self,
        id: UserId,
    ) -> Result<Option<UserDirectories>, StoreError> {
        Ok(self.database.read().await.user(id).map(User::directories))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.database.read().await.users.clone())
    }

    async fn count_users(&self) -> Result<usize, StoreError> {
        Ok(self.database.read().await.users.len())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.mutate(|db| db.insert_user(new_user)).await
    }

    async fn bootstrap_admin(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.mutate(|db| {
            if !db.users.is_empty() {
                return Err(StoreError::AlreadyInitialized);
            }
            db.insert_user(NewUser {
                is_admin: true,
                ..new_user
            })
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        if self.database.read().await.user(id).is_none() {
            return Ok(false);
        }
        self.mutate(|db| Ok(db.remove_user(id).is_some())).await
    }

    async fn update_password(&self, id: UserId, password_hash: String) -> Result<(), StoreError> {
        self.mutate(|db| {
            let user = db.user_mut(id).ok_or(StoreError::UserNotFound(id))?;
            user.password_hash = password_hash;
            Ok(())
        })
        .await
    }

    async fn update_admin_flag(&self, id: UserId, is_admin: bool) -> Result<(), StoreError> {
        self.mutate(|db| {
            let user = db.user_mut(id).ok_or(StoreError::UserNotFound(id))?;
            user.is_admin = is_admin;
            Ok(())
        })
        .await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.database.read().await.settings.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.mutate(|db| {
            db.settings.insert(key.to_string(), value.to_string());
            Ok(())
        })
        .await
    }
}
