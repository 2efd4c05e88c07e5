use crate::{Config, DEFAULT_SESSION_SECRET, store::RecordStore};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create database directory: {0}")]
    DatabaseDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Session secret is the built-in default")]
    DefaultSessionSecret,

    #[error("Media directory for user '{0}' does not exist: {1}")]
    MediaDirectoryMissing(String, String),

    #[error("Could not read user records: {0}")]
    RecordStoreUnavailable(String),
}

impl StartupCheckError {
    /// Critical failures stop the server from starting.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::DatabaseDirectoryCreationFailed(_)
                | StartupCheckError::RecordStoreUnavailable(_)
        )
    }
}

/// Checks that only need the configuration, run before the store is opened.
pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    if config.app.session_secret == DEFAULT_SESSION_SECRET {
        warn!("Session secret is the default value; set [app] session_secret");
        errors.push(StartupCheckError::DefaultSessionSecret);
    }

    if let Some(parent) = config.storage.database.parent()
        && !parent.as_os_str().is_empty()
    {
        if !parent.exists() {
            info!("Database directory does not exist, creating: {:?}", parent);
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!("Failed to create database directory {:?}: {}", parent, e);
                errors.push(StartupCheckError::DatabaseDirectoryCreationFailed(e));
            }
        } else {
            info!("Database directory exists: {:?}", parent);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks against the loaded user records.
pub async fn check_user_records(store: &dyn RecordStore) -> Result<(), Vec<StartupCheckError>> {
    let users = match store.list_users().await {
        Ok(users) => users,
        Err(e) => return Err(vec![StartupCheckError::RecordStoreUnavailable(e.to_string())]),
    };

    if users.is_empty() {
        warn!("No users exist yet; first-admin signup is open at /first-admin-signup");
        return Ok(());
    }

    let mut errors = Vec::new();
    for user in &users {
        for dir in [user.photo_dir.as_deref(), user.video_dir.as_deref()]
            .into_iter()
            .flatten()
        {
            if !directory_exists(dir).await {
                warn!(
                    "Media directory for user '{}' does not exist: {:?}",
                    user.username, dir
                );
                errors.push(StartupCheckError::MediaDirectoryMissing(
                    user.username.clone(),
                    dir.display().to_string(),
                ));
            }
        }
    }

    info!("{} user(s) on record", users.len());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

async fn directory_exists(dir: &Path) -> bool {
    tokio::fs::metadata(dir)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
