pub mod error;
pub mod imgbb;

pub use error::*;
pub use imgbb::ImgbbHost;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Setting key under which admins store the image host API key.
pub const API_KEY_SETTING: &str = "imagebb_api_key";

pub const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublicUploadConfig {
    pub endpoint: String,
}

impl Default for PublicUploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// A third-party host that turns image bytes into a public URL.
#[async_trait]
pub trait PublicHost: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, api_key: &str) -> Result<String, UploadError>;
    fn name(&self) -> &str;
}

pub type DynPublicHost = Arc<dyn PublicHost>;

pub fn create_host(config: &PublicUploadConfig) -> Result<DynPublicHost, UploadError> {
    Ok(Arc::new(ImgbbHost::new(config)?))
}
