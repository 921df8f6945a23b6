// src/auth/tokens.rs
//
// Opaque bearer token lifecycle: issuance, verification, revocation.
// Tokens carry no embedded structure; the random string is only a lookup
// key into the tokens table.

use crate::db::error::RepositoryError;
use crate::db::models::token::{NewToken, Token, TokenType};
use crate::db::repositories::token_repository::TokenRepository;
use crate::error::AppError;
use chrono::{Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use uuid::Uuid;

/// Bytes of OS entropy per token; 40 bytes → 80 hex chars → 320 bits,
/// comfortably above the 160-bit floor for unguessable bearer tokens.
const TOKEN_ENTROPY_BYTES: usize = 40;

/// Collisions are astronomically rare at this entropy, but a unique
/// violation on insert is retried with fresh randomness rather than
/// surfaced to the caller.
const MAX_ISSUE_ATTEMPTS: u32 = 3;

/// Request metadata recorded with every issuance and revocation.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Extracts the client address and user agent from request headers.
    /// Behind a proxy the first X-Forwarded-For entry is the client.
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "127.0.0.1".to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        Self { ip, user_agent }
    }
}

/// Generates an opaque random token string.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct TokenService;

impl TokenService {
    /// Issues a token of the given type for the user and returns the raw
    /// token string. Expiry defaults from the per-type policy table unless
    /// `ttl_override` is given.
    pub fn issue(
        user_id: Uuid,
        token_type: TokenType,
        client: &ClientInfo,
        ttl_override: Option<Duration>,
    ) -> Result<String, AppError> {
        let ttl = ttl_override.unwrap_or_else(|| token_type.default_ttl());

        let mut attempts = 0;
        loop {
            let token = generate_token();
            let new_token = NewToken {
                user_id,
                token_type,
                token: token.clone(),
                expires_at: Utc::now() + ttl,
                created_by_ip: Some(client.ip.clone()),
                user_agent: client.user_agent.clone(),
            };

            match TokenRepository::create(&new_token) {
                Ok(_) => return Ok(token),
                Err(RepositoryError::UniqueViolation(msg)) => {
                    attempts += 1;
                    tracing::warn!(attempts, "Token value collision, regenerating: {msg}");
                    if attempts >= MAX_ISSUE_ATTEMPTS {
                        return Err(AppError::database(msg));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Validates a presented token against type, expiry, and revocation
    /// status. Returns the full record on success (callers need `user_id`);
    /// all failure modes collapse to `None`.
    pub fn verify(token: &str, expected_type: TokenType) -> Result<Option<Token>, AppError> {
        let record = TokenRepository::find_valid(token, expected_type)?;
        Ok(record.filter(|t| t.is_valid(Utc::now())))
    }

    /// Revokes one token by exact value; missing or already-revoked tokens
    /// are a no-op.
    pub fn revoke(token: &str, ip: &str) -> Result<(), AppError> {
        TokenRepository::revoke(token, ip).map_err(Into::into)
    }

    /// Revokes every live token of the user, across all types. Used
    /// defensively after a password reset to kill outstanding sessions.
    pub fn revoke_all_for_user(user_id: Uuid, ip: &str) -> Result<(), AppError> {
        TokenRepository::revoke_all_for_user(user_id, ip).map_err(Into::into)
    }
}
