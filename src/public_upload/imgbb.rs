use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use super::{PublicHost, PublicUploadConfig, UploadError};

pub struct ImgbbHost {
    client: reqwest::Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgbbData>,
    error: Option<ImgbbErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ImgbbErrorBody {
    message: Option<String>,
}

impl ImgbbHost {
    pub fn new(config: &PublicUploadConfig) -> Result<Self, UploadError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| UploadError::ConfigError(format!("{}: {}", config.endpoint, e)))?;
        let client = reqwest::Client::builder().build()?;

        Ok(Self { client, endpoint })
    }

    fn upload_url(&self, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", api_key);
        url
    }
}

#[async_trait]
impl PublicHost for ImgbbHost {
    async fn upload(&self, bytes: Vec<u8>, api_key: &str) -> Result<String, UploadError> {
        debug!("Uploading {} bytes to {}", bytes.len(), self.endpoint);

        let encoded = general_purpose::STANDARD.encode(&bytes);
        let response = self
            .client
            .post(self.upload_url(api_key))
            .form(&[("image", encoded)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("ImageBB upload failed with HTTP {}", status);
            return Err(UploadError::HttpStatus(status.as_u16()));
        }

        let body: ImgbbResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        match body {
            ImgbbResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data.url),
            ImgbbResponse { error, .. } => {
                let message = error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Unknown error".to_string());
                error!("ImageBB upload failed: {}", message);
                Err(UploadError::Rejected(message))
            }
        }
    }

    fn name(&self) -> &str {
        "ImageBB"
    }
}
