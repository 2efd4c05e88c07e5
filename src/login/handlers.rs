use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use crate::{
    AppState,
    session::{clear_session_cookie, session_cookie, session_user_id},
    store::User,
};

use super::{
    Enrollment, LoginError, LoginRequest, SessionInfo, SignupRequest, dummy_password_hash,
    register_user, verify_password_blocking,
};

fn session_headers(app_state: &AppState, user: &User) -> Result<HeaderMap, LoginError> {
    let cookie = session_cookie(
        &app_state.config.app.session_secret,
        user.id,
        app_state.config.app.session_ttl_hours,
    )
    .map_err(LoginError::InternalError)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| LoginError::InternalError(e.to_string()))?,
    );
    Ok(headers)
}

/// Sends visitors to first-admin setup, their dashboard, or the login form.
pub async fn home(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Redirect, LoginError> {
    if app_state.store.count_users().await? == 0 {
        return Ok(Redirect::to("/first-admin-signup"));
    }
    if let Some(user_id) = session_user_id(&headers, &app_state.config.app.session_secret)
        && app_state.store.get_user(user_id).await?.is_some()
    {
        return Ok(Redirect::to("/dashboard"));
    }
    Ok(Redirect::to("/login"))
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, LoginError> {
    let user = app_state
        .store
        .get_user_by_name(request.username.trim())
        .await?;

    let verified = match &user {
        Some(user) => {
            verify_password_blocking(request.password, user.password_hash.clone()).await
        }
        None => {
            // Unknown users cost one Argon2 verification too.
            verify_password_blocking(request.password, dummy_password_hash().to_string()).await;
            false
        }
    };

    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!("Failed login attempt for '{}'", request.username);
            return Err(LoginError::InvalidCredentials);
        }
    };

    let headers = session_headers(&app_state, &user)?;
    info!("User {} logged in successfully", user.username);

    Ok((headers, Json(SessionInfo::from(&user))))
}

pub async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = HeaderValue::from_str(&clear_session_cookie()) {
        headers.insert(SET_COOKIE, cookie);
    }

    (headers, Redirect::to("/login"))
}

pub async fn signup(
    State(app_state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, LoginError> {
    let user = register_user(
        app_state.store.as_ref(),
        request,
        Enrollment::Standard { is_admin: false },
    )
    .await?;

    let headers = session_headers(&app_state, &user)?;
    Ok((headers, Json(SessionInfo::from(&user))))
}

/// Only available while the store is empty; afterwards it redirects to login.
pub async fn first_admin_signup(
    State(app_state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Response, LoginError> {
    if app_state.store.count_users().await? > 0 {
        return Ok(Redirect::to("/login").into_response());
    }

    let user = match register_user(app_state.store.as_ref(), request, Enrollment::FirstAdmin).await
    {
        Ok(user) => user,
        Err(LoginError::AlreadyInitialized) => {
            return Ok(Redirect::to("/login").into_response());
        }
        Err(e) => return Err(e),
    };

    let headers = session_headers(&app_state, &user)?;
    info!("First administrator '{}' created", user.username);

    Ok((headers, Json(SessionInfo::from(&user))).into_response())
}
