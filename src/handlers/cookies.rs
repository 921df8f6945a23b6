// src/handlers/cookies.rs
//
// All cookie reading/writing for the session pair lives here, at the route
// boundary; the guard itself only sees explicit token values.

use crate::db::models::token::TokenType;
use crate::error::AppError;
use axum::http::{HeaderMap, HeaderValue, header};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Reads one cookie value out of the Cookie header, if present.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|kv| {
        let mut it = kv.trim().splitn(2, '=');
        match (it.next(), it.next()) {
            (Some(n), Some(v)) if n == name => Some(v.trim().to_string()),
            _ => None,
        }
    })
}

fn set_cookie(name: &str, value: &str, max_age_seconds: i64) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!(
        "{name}={value}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={max_age_seconds}"
    ))
    .map_err(|_| AppError::internal("Failed to build cookie header"))
}

/// Set-Cookie pair for a fresh login: both session tokens, with max-age
/// matching each token's lifetime.
pub fn session_cookie_headers(
    access_token: &str,
    refresh_token: &str,
) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        set_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token,
            TokenType::Access.default_ttl().num_seconds(),
        )?,
    );
    headers.append(
        header::SET_COOKIE,
        set_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token,
            TokenType::Refresh.default_ttl().num_seconds(),
        )?,
    );
    Ok(headers)
}

/// Replaces only the access-token cookie after the guard self-healed from
/// the refresh token. The refresh cookie is left untouched (no rotation).
pub fn renewed_access_cookie_headers(access_token: &str) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        set_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token,
            TokenType::Access.default_ttl().num_seconds(),
        )?,
    );
    Ok(headers)
}

/// Expires both session cookies (logout, failed refresh).
pub fn clear_session_cookie_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        HeaderValue::from_static(
            "access_token=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
        ),
    );
    headers.append(
        header::SET_COOKIE,
        HeaderValue::from_static(
            "refresh_token=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
        ),
    );
    headers
}
