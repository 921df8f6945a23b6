// src/auth/guard.rs
//
// Access/refresh reconciliation. The guard consumes the cookie pair as an
// explicit value and returns a tagged outcome; reading and writing the
// actual cookies stays at the route boundary.

use crate::auth::tokens::{ClientInfo, TokenService};
use crate::db::models::token::TokenType;
use crate::db::models::user::{User, UserRole};
use crate::db::repositories::user_repository::UserRepository;
use crate::error::AppError;

/// The session credentials a request presented, already lifted out of the
/// cookie header.
#[derive(Debug, Clone, Default)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// An authenticated request. `renewed_access_token` is set when the guard
/// self-healed an expired access token from the refresh token; the route
/// boundary is responsible for re-setting the cookie.
#[derive(Debug)]
pub struct AuthedSession {
    pub user: User,
    pub renewed_access_token: Option<String>,
}

/// Tagged authentication result; the HTTP layer decides how each arm maps
/// to a response.
#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(AuthedSession),
    Unauthenticated,
    Forbidden,
}

pub struct SessionGuard;

impl SessionGuard {
    /// Per-request state machine:
    /// 1. no access token → Unauthenticated
    /// 2. access token verifies → user lookup → Authenticated
    /// 3. access token fails → single refresh fallback: a valid refresh
    ///    token mints exactly one replacement access token for the same
    ///    user (the refresh token itself is NOT rotated); anything else is
    ///    terminal Unauthenticated
    /// 4. role mismatch against `required_role` → Forbidden
    pub fn authenticate(
        tokens: &SessionTokens,
        required_role: Option<UserRole>,
        client: &ClientInfo,
    ) -> Result<AuthOutcome, AppError> {
        let Some(access_token) = tokens.access_token.as_deref() else {
            return Ok(AuthOutcome::Unauthenticated);
        };

        let (user_id, needs_renewal) =
            match TokenService::verify(access_token, TokenType::Access)? {
                Some(record) => (record.user_id, false),
                None => {
                    let Some(refresh_token) = tokens.refresh_token.as_deref() else {
                        return Ok(AuthOutcome::Unauthenticated);
                    };
                    let Some(record) = TokenService::verify(refresh_token, TokenType::Refresh)?
                    else {
                        return Ok(AuthOutcome::Unauthenticated);
                    };
                    (record.user_id, true)
                }
            };

        let Some(user) = UserRepository::find_by_id(user_id)? else {
            return Ok(AuthOutcome::Unauthenticated);
        };

        let renewed_access_token = if needs_renewal {
            Some(TokenService::issue(
                user.id,
                TokenType::Access,
                client,
                None,
            )?)
        } else {
            None
        };

        if let Some(required) = required_role
            && user.role != required
        {
            return Ok(AuthOutcome::Forbidden);
        }

        Ok(AuthOutcome::Authenticated(AuthedSession {
            user,
            renewed_access_token,
        }))
    }
}
