use axum::{
    Json,
    extract::{
        Multipart, Path, Query, Request, State,
        multipart::Field,
    },
    http::{
        HeaderValue, StatusCode,
        header::{ETAG, IF_NONE_MATCH},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::UNIX_EPOCH;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{info, warn};

use super::{
    MediaError, MediaKind, MediaMetadata, MediaQuery, Page, PageRequest, PendingUpload,
    PublicLinkResponse, UploadResponse, ViewResponse, media_url,
};
use crate::{AppState, login::CurrentUser, public_upload::API_KEY_SETTING};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub username: String,
    pub is_admin: bool,
    #[serde(flatten)]
    pub page: Page,
}

/// First page of the signed-in user's media.
pub async fn dashboard(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardResponse>, MediaError> {
    let request = PageRequest::first(app_state.media.config());
    let page = app_state.media.page_for_user(user.id, request).await?;

    Ok(Json(DashboardResponse {
        username: user.username,
        is_admin: user.is_admin,
        page,
    }))
}

/// Endless-scroll listing: `?page=N&per_page=M`.
pub async fn api_media(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MediaQuery>,
) -> Result<Json<Page>, MediaError> {
    let request = PageRequest::from_query(&query, app_state.media.config());
    let page = app_state.media.page_for_user(user.id, request).await?;
    Ok(Json(page))
}

/// Streams an authorized file. Range requests and `Last-Modified` come from
/// `ServeFile`; a weak `ETag` built from size and mtime is added on top.
pub async fn serve_media(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response, MediaError> {
    let location = app_state.media.authorize(&user, &filename).await?;
    let metadata = tokio::fs::metadata(&location.path).await?;
    let etag = weak_etag(&metadata);

    if let Some(etag) = &etag
        && let Some(if_none_match) = request
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|value| value.to_str().ok())
        && etag_matches(if_none_match, etag)
    {
        return Ok((StatusCode::NOT_MODIFIED, [(ETAG, etag.clone())]).into_response());
    }

    let mut response = ServeFile::new(&location.path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {})
        .into_response();

    if response.status().is_success()
        && let Some(etag) = etag
        && let Ok(value) = HeaderValue::from_str(&etag)
    {
        response.headers_mut().insert(ETAG, value);
    }

    Ok(response)
}

fn weak_etag(metadata: &std::fs::Metadata) -> Option<String> {
    let modified = metadata.modified().ok()?.duration_since(UNIX_EPOCH).ok()?;
    Some(format!(
        "W/\"{:x}-{:x}\"",
        metadata.len(),
        modified.as_nanos()
    ))
}

/// Weak comparison against an `If-None-Match` list.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let opaque = |tag: &str| tag.trim().trim_start_matches("W/").to_string();
    let etag = opaque(etag);

    if_none_match
        .split(',')
        .any(|candidate| candidate.trim() == "*" || opaque(candidate) == etag)
}

pub async fn view_media(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(filename): Path<String>,
) -> Result<Json<ViewResponse>, MediaError> {
    let location = app_state.media.authorize(&user, &filename).await?;

    let content_type = mime_guess::from_path(&location.path)
        .first_or_octet_stream()
        .to_string();

    Ok(Json(ViewResponse {
        media_url: media_url(&location.filename),
        filename: location.filename,
        kind: location.kind,
        content_type,
        owner: location.owner,
    }))
}

pub async fn delete_media(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(filename): Path<String>,
) -> Result<StatusCode, MediaError> {
    app_state.media.delete(&user, &filename).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stores the multipart field `file` in the matching media directory.
/// An existing file with the same name is replaced.
pub async fn upload_media(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), MediaError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| MediaError::MultipartError(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let (filename, kind, path) = app_state
            .media
            .upload_destination(&user, &original_name)
            .await?;

        let mut pending = PendingUpload::create(&path).await?;
        if let Err(e) = copy_field(&mut field, &mut pending).await {
            pending.abort().await;
            return Err(e);
        }
        let written = pending.commit().await?;

        info!(
            "User {} uploaded {} ({} bytes) to {:?}",
            user.username, filename, written, path
        );

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                media_url: media_url(&filename),
                filename,
                kind,
            }),
        ));
    }

    Err(MediaError::MultipartError("missing file field".to_string()))
}

async fn copy_field(field: &mut Field<'_>, pending: &mut PendingUpload) -> Result<(), MediaError> {
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| MediaError::MultipartError(e.to_string()))?
    {
        pending.write(&chunk).await?;
    }
    Ok(())
}

pub async fn media_metadata(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(filename): Path<String>,
) -> Result<Json<MediaMetadata>, MediaError> {
    super::validate_filename(&filename)?;
    if MediaKind::from_filename(&filename) != Some(MediaKind::Photo) {
        return Err(MediaError::UnsupportedType(filename));
    }

    let location = app_state.media.authorize(&user, &filename).await?;
    let metadata = app_state.media.photo_metadata(&location).await?;
    Ok(Json(metadata))
}

/// Publishes an authorized photo on the public image host.
/// The photo becomes world-readable.
pub async fn upload_public(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(filename): Path<String>,
) -> Result<Json<PublicLinkResponse>, MediaError> {
    super::validate_filename(&filename)?;
    if MediaKind::from_filename(&filename) != Some(MediaKind::Photo) {
        return Err(MediaError::UnsupportedType(filename));
    }

    let location = app_state.media.authorize(&user, &filename).await?;

    let api_key = app_state
        .store
        .get_setting(API_KEY_SETTING)
        .await?
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            MediaError::Unconfigured(
                "ImageBB API key not configured. Please set it in admin settings.".to_string(),
            )
        })?;

    let bytes = tokio::fs::read(&location.path).await?;
    let public_link = match app_state.public_host.upload(bytes, &api_key).await {
        Ok(link) => link,
        Err(e) => {
            warn!(
                "Failed to upload {} to {}: {}",
                filename,
                app_state.public_host.name(),
                e
            );
            return Err(e.into());
        }
    };

    info!(
        "User {} published {} at {}",
        user.username, filename, public_link
    );
    Ok(Json(PublicLinkResponse { public_link }))
}
