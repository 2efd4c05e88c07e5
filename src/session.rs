use axum::http::HeaderMap;
use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::store::UserId;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";

pub fn create_signed_cookie(secret: &str, value: &str) -> Result<String, String> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| "Invalid secret key")?;
    mac.update(value.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);
    Ok(format!("{}:{}", value, signature_b64))
}

pub fn verify_signed_cookie(secret: &str, signed_value: &str) -> bool {
    if let Some((value, signature_b64)) = signed_value.split_once(':')
        && let Ok(signature) = general_purpose::URL_SAFE_NO_PAD.decode(signature_b64)
        && let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes())
    {
        mac.update(value.as_bytes());
        return mac.verify_slice(&signature).is_ok();
    }
    false
}

pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get("cookie")?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let cookie = cookie.trim();
            if let Some((key, value)) = cookie.split_once('=') {
                if key.trim() == name {
                    Some(value.trim().to_string())
                } else {
                    None
                }
            } else {
                None
            }
        })
}

/// Builds the `Set-Cookie` value for a fresh session.
///
/// The signed payload is `<user_id>.<expires_unix>`, so a session carries its
/// own expiry and nothing is kept server side.
pub fn session_cookie(secret: &str, user_id: UserId, ttl_hours: u64) -> Result<String, String> {
    let ttl_seconds = ttl_hours.saturating_mul(3600);
    let expires_at = chrono::Utc::now().timestamp() + ttl_seconds as i64;
    let signed_value = create_signed_cookie(secret, &format!("{}.{}", user_id, expires_at))?;

    Ok(format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, signed_value, ttl_seconds
    ))
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

/// Returns the user id carried by a valid, unexpired session cookie.
pub fn session_user_id(headers: &HeaderMap, secret: &str) -> Option<UserId> {
    let signed_value = get_cookie_value(headers, SESSION_COOKIE)?;
    if !verify_signed_cookie(secret, &signed_value) {
        return None;
    }

    let (payload, _) = signed_value.split_once(':')?;
    let (user_id, expires_at) = payload.split_once('.')?;
    let user_id = user_id.parse::<UserId>().ok()?;
    let expires_at = expires_at.parse::<i64>().ok()?;

    if expires_at <= chrono::Utc::now().timestamp() {
        return None;
    }

    Some(user_id)
}
