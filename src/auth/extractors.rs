use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::auth::guard::{AuthOutcome, SessionGuard, SessionTokens};
use crate::auth::tokens::ClientInfo;
use crate::db::models::user::{User, UserRole};
use crate::error::AppError;
use crate::handlers::cookies::{
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, clear_session_cookie_headers, cookie_value,
};

/// Rejection for guard-protected routes. An unauthenticated request also
/// gets both session cookies expired; other failures (forbidden, store
/// errors) leave the cookies alone.
#[derive(Debug)]
pub struct GuardRejection(AppError);

impl From<AppError> for GuardRejection {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        let clear_cookies = matches!(self.0, AppError::Unauthenticated);
        let mut response = self.0.into_response();
        if clear_cookies {
            response
                .headers_mut()
                .extend(clear_session_cookie_headers());
        }
        response
    }
}

/// Extractor for guard-protected routes. Lifts the session cookie pair out
/// of the request, runs the guard, and rejects with 401 when the request
/// cannot be authenticated.
///
/// When the guard self-healed via the refresh token, `renewed_access_token`
/// carries the replacement; the handler attaches it as a Set-Cookie.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub renewed_access_token: Option<String>,
}

impl AuthSession {
    /// Role gate for restricted handlers: 403, distinct from the 401 the
    /// extractor itself produces.
    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        if self.user.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tokens = SessionTokens {
            access_token: cookie_value(&parts.headers, ACCESS_TOKEN_COOKIE),
            refresh_token: cookie_value(&parts.headers, REFRESH_TOKEN_COOKIE),
        };
        let client = ClientInfo::from_headers(&parts.headers);

        match SessionGuard::authenticate(&tokens, None, &client)? {
            AuthOutcome::Authenticated(session) => Ok(AuthSession {
                user: session.user,
                renewed_access_token: session.renewed_access_token,
            }),
            AuthOutcome::Unauthenticated => Err(AppError::Unauthenticated.into()),
            AuthOutcome::Forbidden => Err(AppError::Forbidden.into()),
        }
    }
}
