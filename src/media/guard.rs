use std::io::ErrorKind;
use std::path::{Component, Path};
use tracing::{debug, info, warn};

use super::{MediaError, MediaKind, MediaLibrary, MediaLocation};
use crate::store::User;

/// Accepts only a single plain file name: no separators, no `.`/`..`, no
/// absolute or prefixed paths.
pub fn validate_filename(filename: &str) -> Result<(), MediaError> {
    if filename.is_empty() || filename.contains('\\') {
        return Err(MediaError::InvalidPath);
    }

    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == filename => Ok(()),
        _ => Err(MediaError::InvalidPath),
    }
}

impl MediaLibrary {
    /// Resolves `filename` to a concrete file the requester may act on.
    ///
    /// Owners always get their own file. Admins get the file from whichever
    /// user's directories contain it. Anyone else gets `Forbidden` when the
    /// file belongs to another user, and `NotFound` when no user has it.
    pub async fn authorize(
        &self,
        requester: &User,
        filename: &str,
    ) -> Result<MediaLocation, MediaError> {
        validate_filename(filename)?;
        let kind = MediaKind::from_filename(filename).ok_or(MediaError::NotFound)?;

        if let Some(location) = locate(requester, filename, kind).await? {
            return Ok(location);
        }

        for owner in self.store.list_users().await? {
            if owner.id == requester.id {
                continue;
            }
            if let Some(location) = locate(&owner, filename, kind).await? {
                if requester.is_admin {
                    debug!(
                        "Admin {} accessing {} owned by {}",
                        requester.username, filename, owner.username
                    );
                    return Ok(location);
                }
                warn!(
                    "User {} denied access to {} owned by {}",
                    requester.username, filename, owner.username
                );
                return Err(MediaError::Forbidden);
            }
        }

        Err(MediaError::NotFound)
    }

    /// Boolean form of [`MediaLibrary::authorize`]. Only unexpected failures
    /// are errors.
    pub async fn can_access(&self, requester: &User, filename: &str) -> Result<bool, MediaError> {
        match self.authorize(requester, filename).await {
            Ok(_) => Ok(true),
            Err(MediaError::NotFound | MediaError::Forbidden | MediaError::InvalidPath) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(
        &self,
        requester: &User,
        filename: &str,
    ) -> Result<MediaLocation, MediaError> {
        let location = self.authorize(requester, filename).await?;

        match tokio::fs::remove_file(&location.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(MediaError::NotFound),
            Err(e) => return Err(e.into()),
        }

        info!(
            "User {} deleted {} owned by {}",
            requester.username, location.filename, location.owner
        );
        Ok(location)
    }
}

/// Looks for `filename` under the owner's photo directory, then video
/// directory. Only regular files count.
async fn locate(
    owner: &User,
    filename: &str,
    kind: MediaKind,
) -> Result<Option<MediaLocation>, MediaError> {
    for dir in [owner.photo_dir.as_deref(), owner.video_dir.as_deref()]
        .into_iter()
        .flatten()
    {
        let path = dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {
                return Ok(Some(MediaLocation {
                    filename: filename.to_string(),
                    path,
                    kind,
                    owner_id: owner.id,
                    owner: owner.username.clone(),
                }));
            }
            Ok(_) => {}
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(None)
}
