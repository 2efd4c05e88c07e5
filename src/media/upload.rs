use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{MediaError, MediaKind, MediaLibrary};
use crate::store::User;

/// Reduces a client-supplied name to a safe single file name.
///
/// Path separators become spaces, anything outside `[A-Za-z0-9._-]` is
/// dropped, whitespace runs become `_`, and leading dots/underscores are
/// stripped. An empty result means the name was unusable.
pub fn sanitize_filename(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .trim_start_matches(['.', '_'])
        .to_string()
}

impl MediaLibrary {
    /// Picks the file an upload named `original_name` should be written to.
    ///
    /// Photos go to the photo directory and videos to the video directory; the
    /// target directory has to be configured and already exist.
    pub async fn upload_destination(
        &self,
        user: &User,
        original_name: &str,
    ) -> Result<(String, MediaKind, PathBuf), MediaError> {
        let filename = sanitize_filename(original_name);
        if filename.is_empty() {
            return Err(MediaError::UnsupportedType(original_name.to_string()));
        }

        let kind = MediaKind::from_filename(&filename)
            .ok_or_else(|| MediaError::UnsupportedType(filename.clone()))?;

        let directory = match kind {
            MediaKind::Photo => user.photo_dir.as_ref(),
            MediaKind::Video => user.video_dir.as_ref(),
        }
        .ok_or_else(|| {
            MediaError::Unconfigured(format!(
                "{:?} directory for {} is not configured",
                kind, user.username
            ))
        })?;

        if !tokio::fs::metadata(directory)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(MediaError::Unconfigured(format!(
                "Upload directory {:?} not found",
                directory
            )));
        }

        debug!("Upload {} for {} -> {:?}", filename, user.username, directory);
        let path = directory.join(&filename);
        Ok((filename, kind, path))
    }
}

/// An upload being written next to its target as `.<name>.part`.
///
/// The target is only touched by the final rename in [`PendingUpload::commit`],
/// so a failed upload never truncates or removes an existing file.
pub struct PendingUpload {
    part_path: PathBuf,
    target: PathBuf,
    file: tokio::fs::File,
    written: u64,
}

impl PendingUpload {
    pub async fn create(target: &Path) -> Result<Self, MediaError> {
        let name = target
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(MediaError::InvalidPath)?;
        let part_path = target.with_file_name(format!(".{}.part", name));
        let file = tokio::fs::File::create(&part_path).await?;

        Ok(Self {
            part_path,
            target: target.to_path_buf(),
            file,
            written: 0,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), MediaError> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes the part file and moves it over the target.
    pub async fn commit(mut self) -> Result<u64, MediaError> {
        if let Err(e) = self.file.flush().await {
            self.abort().await;
            return Err(e.into());
        }
        if let Err(e) = self.file.sync_all().await {
            self.abort().await;
            return Err(e.into());
        }

        let Self {
            part_path,
            target,
            file,
            written,
        } = self;
        drop(file);

        if let Err(e) = tokio::fs::rename(&part_path, &target).await {
            remove_part_file(&part_path).await;
            return Err(e.into());
        }
        Ok(written)
    }

    /// Drops the part file; the target is left as it was.
    pub async fn abort(self) {
        let Self { part_path, file, .. } = self;
        drop(file);
        remove_part_file(&part_path).await;
    }
}

async fn remove_part_file(part_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(part_path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("Failed to remove partial upload {:?}: {}", part_path, e);
    }
}
