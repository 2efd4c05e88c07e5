use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::LoginError;
use crate::{AppState, session::session_user_id, store::User};

/// The signed-in user, loaded fresh from the record store for this request.
///
/// No session cookie is `NotAuthenticated`; a valid cookie for a user that no
/// longer exists is `Forbidden`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = LoginError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = session_user_id(&parts.headers, &state.config.app.session_secret)
            .ok_or(LoginError::NotAuthenticated)?;

        match state.store.get_user(user_id).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!("Session refers to unknown user id {}", user_id);
                Err(LoginError::Forbidden)
            }
        }
    }
}

/// A signed-in user holding the admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = LoginError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            warn!("User {} denied access to admin route", user.username);
            return Err(LoginError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
