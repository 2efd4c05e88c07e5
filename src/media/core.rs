use tracing::debug;

use super::{MediaError, MediaKind, MediaLibrary, OwnedMedia, Page, PageRequest, scan_directory};
use crate::store::{UserDirectories, UserId};

impl MediaLibrary {
    /// All of a user's photos and videos, newest first.
    ///
    /// "Newest" means descending filename order, which matches upload order
    /// only for timestamp-prefixed names. Unknown users and users without
    /// directories get an empty list.
    pub async fn list_user_media(&self, user_id: UserId) -> Result<Vec<String>, MediaError> {
        match self.store.get_user_directories(user_id).await? {
            Some(directories) => list_media_in(&directories).await,
            None => {
                debug!("No directories on record for user {}", user_id);
                Ok(Vec::new())
            }
        }
    }

    pub async fn page_for_user(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<Page, MediaError> {
        let files = self.list_user_media(user_id).await?;
        let page = paginate(&files, request.page, request.per_page);

        debug!(
            "Pagination: page={}, per_page={}, total={}, returning {} files",
            request.page,
            request.per_page,
            files.len(),
            page.files.len()
        );

        Ok(page)
    }

    /// Every user's media tagged with its owner, for the admin overview.
    pub async fn list_all_media(&self) -> Result<Vec<OwnedMedia>, MediaError> {
        let mut all = Vec::new();

        for user in self.store.list_users().await? {
            let directories = user.directories();
            if !directories.is_configured() {
                continue;
            }
            for filename in list_media_in(&directories).await? {
                if let Some(kind) = MediaKind::from_filename(&filename) {
                    all.push(OwnedMedia {
                        filename,
                        kind,
                        username: user.username.clone(),
                    });
                }
            }
        }

        Ok(all)
    }
}

pub(crate) async fn list_media_in(
    directories: &UserDirectories,
) -> Result<Vec<String>, MediaError> {
    let mut files = scan_directory(directories.photo_dir.as_deref(), MediaKind::Photo).await?;
    files.extend(scan_directory(directories.video_dir.as_deref(), MediaKind::Video).await?);
    files.sort_by(|a, b| b.cmp(a));
    Ok(files)
}

/// Slices `files` to the 1-indexed `page` of `per_page` entries.
///
/// Pages past the end are empty. `has_more` is true when entries remain after
/// this page.
pub fn paginate(files: &[String], page: usize, per_page: usize) -> Page {
    let page = page.max(1);
    let per_page = per_page.max(1);

    let start = (page - 1).saturating_mul(per_page);
    let end = page.saturating_mul(per_page);

    let slice = if start < files.len() {
        files[start..end.min(files.len())].to_vec()
    } else {
        Vec::new()
    };

    Page {
        files: slice,
        has_more: end < files.len(),
    }
}
