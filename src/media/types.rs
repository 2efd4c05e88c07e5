use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::MediaConfig;
use crate::store::UserId;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "mp4", "mov", "avi"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Classifies a filename by its last dot-segment, case-insensitively.
    /// Names without an allowed extension are not media at all.
    pub fn from_filename(file_name: &str) -> Option<MediaKind> {
        let (_, extension) = file_name.rsplit_once('.')?;
        let extension = extension.to_lowercase();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            None
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Some(MediaKind::Video)
        } else {
            Some(MediaKind::Photo)
        }
    }
}

/// One page of a user's media listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub files: Vec<String>,
    pub has_more: bool,
}

/// Raw `page`/`per_page` query parameters. Kept as strings so that garbage
/// falls back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaQuery {
    pub page: Option<String>,
    #[serde(alias = "perPage")]
    pub per_page: Option<String>,
}

/// A validated, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub fn first(config: &MediaConfig) -> Self {
        Self {
            page: 1,
            per_page: config.per_page.max(1),
        }
    }

    pub fn from_query(query: &MediaQuery, config: &MediaConfig) -> Self {
        let default = Self::first(config);
        let page = parse_positive(query.page.as_deref()).unwrap_or(default.page);
        let per_page = parse_positive(query.per_page.as_deref())
            .unwrap_or(default.per_page)
            .min(config.max_per_page.max(1));

        Self { page, per_page }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse::<usize>().ok().filter(|value| *value > 0)
}

/// Where an authorized filename actually lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLocation {
    pub filename: String,
    pub path: PathBuf,
    pub kind: MediaKind,
    pub owner_id: UserId,
    pub owner: String,
}

/// A file as listed on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedMedia {
    pub filename: String,
    pub kind: MediaKind,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub filename: String,
    pub kind: MediaKind,
    pub media_url: String,
    pub content_type: String,
    pub owner: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub kind: MediaKind,
    pub media_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaMetadata {
    pub filename: String,
    pub dimensions: String,
    pub format: Option<String>,
    pub mode: String,
    pub size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLinkResponse {
    pub public_link: String,
}

pub fn media_url(filename: &str) -> String {
    format!("/media/{}", urlencoding::encode(filename))
}
