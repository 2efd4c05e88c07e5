use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod admin;
pub mod login;
pub mod media;
pub mod public_upload;
pub mod session;
pub mod startup_checks;
pub mod store;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub public_upload: public_upload::PublicUploadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

pub const DEFAULT_SESSION_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    /// HMAC key for session cookies.
    pub session_secret: String,
    pub session_ttl_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Selfly".to_string(),
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            session_ttl_hours: 168,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database: PathBuf,
    /// How often the server checks the database file for outside edits.
    /// `0` disables the check.
    pub reload_interval_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("database.toml"),
            reload_interval_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Page size used when a request does not ask for one.
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: usize,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_per_page() -> usize {
    20
}

fn default_max_per_page() -> usize {
    200
}

fn default_max_upload_mb() -> usize {
    512
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use public_upload::DynPublicHost;
use store::{DynRecordStore, TomlRecordStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: DynRecordStore,
    pub media: media::SharedMediaLibrary,
    pub public_host: DynPublicHost,
}

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("Failed to open record store: {0}")]
    Store(#[from] store::StoreError),

    #[error("Failed to set up public upload host: {0}")]
    PublicHost(#[from] public_upload::UploadError),
}

impl AppState {
    pub fn new(config: Config, store: DynRecordStore, public_host: DynPublicHost) -> Self {
        let media = Arc::new(media::MediaLibrary::new(
            store.clone(),
            config.media.clone(),
        ));

        Self {
            config,
            store,
            media,
            public_host,
        }
    }

    /// Opens the TOML record store and the configured public host.
    pub async fn from_config(config: Config) -> Result<Self, AppInitError> {
        let store = TomlRecordStore::open(config.storage.database.clone()).await?;
        let public_host = public_upload::create_host(&config.public_upload)?;
        Ok(Self::new(config, Arc::new(store), public_host))
    }
}

pub async fn create_app(config: Config) -> Result<Router, AppInitError> {
    let app_state = AppState::from_config(config).await?;
    Ok(router(app_state))
}

pub fn router(app_state: AppState) -> Router {
    let upload_limit = app_state
        .config
        .media
        .max_upload_mb
        .saturating_mul(1024 * 1024);

    Router::new()
        .route("/", get(login::home))
        .route("/login", post(login::login))
        .route("/logout", get(login::logout))
        .route("/signup", post(login::signup))
        .route("/first-admin-signup", post(login::first_admin_signup))
        .route("/dashboard", get(media::dashboard))
        .route("/api/media", get(media::api_media))
        .route("/api/metadata/{filename}", get(media::media_metadata))
        .route(
            "/api/upload-public/{filename}",
            post(media::upload_public),
        )
        .route(
            "/upload",
            post(media::upload_media).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/media/{*filename}", get(media::serve_media))
        .route("/view/{*filename}", get(media::view_media))
        .route(
            "/delete/{*filename}",
            get(media::delete_media).post(media::delete_media),
        )
        .route("/admin", get(admin::admin_dashboard))
        .route(
            "/admin/settings",
            get(admin::get_settings).post(admin::update_settings),
        )
        .route("/admin/create_user", post(admin::create_user))
        .route(
            "/admin/delete_user/{id}",
            get(admin::delete_user).post(admin::delete_user),
        )
        .route("/admin/change_password/{id}", post(admin::change_password))
        .route(
            "/admin/toggle_admin/{id}",
            get(admin::toggle_admin).post(admin::toggle_admin),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let headers = request.headers();
                    let user_agent = headers
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %request.uri().path(),
                        user_agent = %user_agent,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            size = %size,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}
