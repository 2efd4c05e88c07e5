use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, warn};

use super::{AdminDashboard, AdminError, ChangePasswordRequest, CreateUserRequest, SettingsForm};
use crate::{
    AppState,
    login::{AdminUser, Enrollment, LoginError, SessionInfo, hash_password_blocking, register_user},
    public_upload::API_KEY_SETTING,
    store::{UserId, UserSummary},
};

pub async fn admin_dashboard(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminDashboard>, AdminError> {
    let users = app_state
        .store
        .list_users()
        .await?
        .iter()
        .map(|user| user.summary())
        .collect();
    let media = app_state.media.list_all_media().await?;

    Ok(Json(AdminDashboard { users, media }))
}

pub async fn get_settings(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<SettingsForm>, AdminError> {
    let imagebb_api_key = app_state
        .store
        .get_setting(API_KEY_SETTING)
        .await?
        .unwrap_or_default();

    Ok(Json(SettingsForm { imagebb_api_key }))
}

pub async fn update_settings(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(form): Json<SettingsForm>,
) -> Result<Json<SettingsForm>, AdminError> {
    let value = form.imagebb_api_key.trim().to_string();
    app_state.store.set_setting(API_KEY_SETTING, &value).await?;
    info!("Admin {} updated application settings", admin.username);

    Ok(Json(SettingsForm {
        imagebb_api_key: value,
    }))
}

pub async fn create_user(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<SessionInfo>), AdminError> {
    let user = register_user(
        app_state.store.as_ref(),
        request.account,
        Enrollment::Standard {
            is_admin: request.is_admin,
        },
    )
    .await?;

    info!("Admin {} created user {}", admin.username, user.username);
    Ok((StatusCode::CREATED, Json(SessionInfo::from(&user))))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, AdminError> {
    if user_id == admin.id {
        warn!("Admin {} attempted to delete their own account", admin.username);
        return Err(AdminError::CannotDeleteSelf);
    }

    if !app_state.store.delete_user(user_id).await? {
        return Err(AdminError::UserNotFound(user_id));
    }

    info!("Admin {} deleted user id {}", admin.username, user_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<UserId>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AdminError> {
    if request.new_password.is_empty() {
        return Err(LoginError::InvalidInput("password must not be empty".to_string()).into());
    }

    let password_hash = hash_password_blocking(request.new_password).await?;
    app_state
        .store
        .update_password(user_id, password_hash)
        .await?;

    info!("Admin {} changed password of user id {}", admin.username, user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Flips the admin flag. Admins may demote themselves.
pub async fn toggle_admin(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserSummary>, AdminError> {
    let user = app_state
        .store
        .get_user(user_id)
        .await?
        .ok_or(AdminError::UserNotFound(user_id))?;

    app_state
        .store
        .update_admin_flag(user_id, !user.is_admin)
        .await?;

    info!(
        "Admin {} set admin={} for user {}",
        admin.username, !user.is_admin, user.username
    );

    let mut summary = user.summary();
    summary.is_admin = !user.is_admin;
    Ok(Json(summary))
}
