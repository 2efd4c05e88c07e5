use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use super::{MediaError, MediaKind};

/// Lists the media files of one kind directly inside `directory`.
///
/// An unset or missing directory yields an empty list. Any other I/O failure,
/// including one in the middle of the listing, is returned to the caller.
/// Subdirectories are skipped, not descended into. Entries come back in
/// directory order.
pub async fn scan_directory(
    directory: Option<&Path>,
    kind: MediaKind,
) -> Result<Vec<String>, MediaError> {
    let Some(directory) = directory else {
        return Ok(Vec::new());
    };

    debug!("Scanning {:?} for {:?} files", directory, kind);

    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Media directory {:?} does not exist", directory);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            debug!("Skipping non UTF-8 file name {:?}", entry.path());
            continue;
        };

        if MediaKind::from_filename(file_name) == Some(kind) {
            files.push(file_name.to_string());
        }
    }

    debug!("Found {} {:?} files in {:?}", files.len(), kind, directory);

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"data").unwrap();
        }
    }

    #[tokio::test]
    async fn test_photo_and_video_partition_the_allowed_entries() {
        let temp_dir = TempDir::new().unwrap();
        touch(
            temp_dir.path(),
            &[
                "a.jpg", "b.PNG", "c.gif", "d.jpeg", "e.mp4", "f.MOV", "g.avi", "notes.txt",
                "README", "h.webp",
            ],
        );

        let photos: BTreeSet<_> = scan_directory(Some(temp_dir.path()), MediaKind::Photo)
            .await
            .unwrap()
            .into_iter()
            .collect();
        let videos: BTreeSet<_> = scan_directory(Some(temp_dir.path()), MediaKind::Video)
            .await
            .unwrap()
            .into_iter()
            .collect();

        assert!(photos.is_disjoint(&videos));

        let union: BTreeSet<String> = photos.union(&videos).cloned().collect();
        let expected: BTreeSet<String> = [
            "a.jpg", "b.PNG", "c.gif", "d.jpeg", "e.mp4", "f.MOV", "g.avi",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(union, expected);

        assert!(videos.contains("f.MOV"));
        assert!(photos.contains("b.PNG"));
    }

    #[tokio::test]
    async fn test_missing_or_unset_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        for kind in [MediaKind::Photo, MediaKind::Video] {
            assert!(scan_directory(Some(&missing), kind).await.unwrap().is_empty());
            assert!(scan_directory(None, kind).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_subdirectories_are_not_descended() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), &["top.jpg"]);
        let nested = temp_dir.path().join("album.jpg");
        std::fs::create_dir(&nested).unwrap();
        touch(&nested, &["inner.jpg"]);

        let photos = scan_directory(Some(temp_dir.path()), MediaKind::Photo)
            .await
            .unwrap();
        assert_eq!(photos, vec!["top.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_file_instead_of_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), &["plain.jpg"]);

        let result = scan_directory(Some(&temp_dir.path().join("plain.jpg")), MediaKind::Photo).await;
        assert!(matches!(result, Err(MediaError::IoError(_))));
    }
}
