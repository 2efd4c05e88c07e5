use std::path::Path;
use tracing::{info, warn};

use super::{LoginError, SignupRequest, password::hash_password_blocking};
use crate::store::{NewUser, RecordStore, User};

/// How a new account comes into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrollment {
    /// The very first account; always an admin, refused once any user exists.
    FirstAdmin,
    /// Self-service signup or admin-created account.
    Standard { is_admin: bool },
}

/// Validates the request, hashes the password, stores the account and creates
/// its media directories.
///
/// A directory that cannot be created is logged and skipped: the account stays
/// valid, its listing is simply empty until the directory appears.
pub async fn register_user(
    store: &dyn RecordStore,
    request: SignupRequest,
    enrollment: Enrollment,
) -> Result<User, LoginError> {
    request.validate()?;

    let new_user = NewUser {
        username: request.username.trim().to_string(),
        password_hash: hash_password_blocking(request.password.clone()).await?,
        photo_dir: request.photo_dir(),
        video_dir: request.video_dir(),
        is_admin: matches!(enrollment, Enrollment::Standard { is_admin: true }),
    };

    let user = match enrollment {
        Enrollment::FirstAdmin => store.bootstrap_admin(new_user).await?,
        Enrollment::Standard { .. } => store.create_user(new_user).await?,
    };

    info!(
        "Created user '{}' (id {}, admin: {})",
        user.username, user.id, user.is_admin
    );

    for dir in [user.photo_dir.as_deref(), user.video_dir.as_deref()]
        .into_iter()
        .flatten()
    {
        ensure_directory(dir).await;
    }

    Ok(user)
}

async fn ensure_directory(dir: &Path) {
    if dir.exists() {
        return;
    }
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => info!("Created media directory {:?}", dir),
        Err(e) => warn!("Failed to create media directory {:?}: {}", dir, e),
    }
}
