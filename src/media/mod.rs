// Media module - listing, authorization and serving of per-user media
mod core;
mod error;
mod guard;
mod handlers;
mod metadata;
mod scanner;
mod types;
mod upload;

// Re-export public items
pub use self::core::paginate;
pub use error::MediaError;
pub use guard::validate_filename;
pub use handlers::{
    api_media, dashboard, delete_media, media_metadata, serve_media, upload_media,
    upload_public, view_media,
};
pub use scanner::scan_directory;
pub use types::*;
pub use upload::{PendingUpload, sanitize_filename};

use std::sync::Arc;

use crate::MediaConfig;
use crate::store::DynRecordStore;

pub type SharedMediaLibrary = Arc<MediaLibrary>;

/// Media for every user, as found on disk right now. Nothing is cached: each
/// call rescans the configured directories.
pub struct MediaLibrary {
    pub(crate) store: DynRecordStore,
    pub(crate) config: MediaConfig,
}

impl MediaLibrary {
    pub fn new(store: DynRecordStore, config: MediaConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }
}
