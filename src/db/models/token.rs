use crate::db::schema::tokens;
use chrono::{DateTime, Duration, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{Insertable, Queryable, Selectable};
use std::io::Write;
use uuid::Uuid;

/// Purpose of an issued token, stored as text in the `token_type` column.
/// Fixed at creation; access/refresh are session credentials, while
/// verification/password_reset are single-use action tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum TokenType {
    Access,
    Refresh,
    Verification,
    PasswordReset,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::Verification => "verification",
            TokenType::PasswordReset => "password_reset",
        }
    }

    /// Default lifetime applied at issuance unless the caller overrides it.
    pub fn default_ttl(self) -> Duration {
        match self {
            TokenType::Access => Duration::seconds(15 * 60),
            TokenType::Refresh => Duration::seconds(7 * 24 * 60 * 60),
            TokenType::Verification => Duration::seconds(24 * 60 * 60),
            TokenType::PasswordReset => Duration::seconds(60 * 60),
        }
    }
}

impl ToSql<Text, Pg> for TokenType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for TokenType {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        match value.as_bytes() {
            b"access" => Ok(TokenType::Access),
            b"refresh" => Ok(TokenType::Refresh),
            b"verification" => Ok(TokenType::Verification),
            b"password_reset" => Ok(TokenType::PasswordReset),
            other => Err(format!("Unknown token type: {}", String::from_utf8_lossy(other)).into()),
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tokens)]
pub struct NewToken {
    pub user_id: Uuid,
    pub token_type: TokenType,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_by_ip: Option<String>,
    pub user_agent: Option<String>,
}

// All fields are required for Diesel Queryable deserialization (schema alignment).
// `replaced_by_token` is reserved for rotation chains; current logic never
// populates it.
#[allow(dead_code)]
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Token {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_type: TokenType,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by_ip: Option<String>,
    pub user_agent: Option<String>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by_ip: Option<String>,
    pub replaced_by_token: Option<String>,
}

impl Token {
    /// A token is live iff it has not been revoked and has not passed its
    /// expiry. The expiry boundary itself counts as expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
