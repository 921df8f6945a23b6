use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::token::{NewToken, Token, TokenType};
use crate::db::schema::tokens;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct TokenRepository;

impl TokenRepository {
    pub fn create(new_token: &NewToken) -> Result<Token, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(tokens::table)
            .values(new_token)
            .get_result::<Token>(&mut conn)
            .map_err(Into::into)
    }

    /// Looks up a live token by exact value and type. A revoked token, an
    /// expired token (boundary included), or a token of another type all
    /// come back as `None`; the caller cannot tell those cases apart.
    pub fn find_valid(
        token_value: &str,
        token_type: TokenType,
    ) -> Result<Option<Token>, RepositoryError> {
        let mut conn = get_connection()?;

        tokens::table
            .filter(tokens::token.eq(token_value))
            .filter(tokens::token_type.eq(token_type))
            .filter(tokens::revoked_at.is_null())
            .filter(tokens::expires_at.gt(Utc::now()))
            .first::<Token>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Marks a token revoked, recording when and from where. Matching is by
    /// exact token value; a missing or already-revoked token is a no-op.
    pub fn revoke(token_value: &str, ip: &str) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            tokens::table
                .filter(tokens::token.eq(token_value))
                .filter(tokens::revoked_at.is_null()),
        )
        .set((
            tokens::revoked_at.eq(Utc::now()),
            tokens::revoked_by_ip.eq(ip),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    /// Revokes every currently-unrevoked token of the user, across all
    /// types. Already-revoked rows are untouched, so repeat calls are
    /// idempotent.
    pub fn revoke_all_for_user(user_id: Uuid, ip: &str) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            tokens::table
                .filter(tokens::user_id.eq(user_id))
                .filter(tokens::revoked_at.is_null()),
        )
        .set((
            tokens::revoked_at.eq(Utc::now()),
            tokens::revoked_by_ip.eq(ip),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    /// Full row fetch by value regardless of validity, for tests and
    /// diagnostics.
    #[cfg(test)]
    pub fn find_by_value(token_value: &str) -> Result<Option<Token>, RepositoryError> {
        let mut conn = get_connection()?;

        tokens::table
            .filter(tokens::token.eq(token_value))
            .first::<Token>(&mut conn)
            .optional()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_test_pool;
    use crate::db::models::user::{NewUser, UserRole};
    use crate::db::repositories::user_repository::UserRepository;
    use chrono::Duration;

    fn create_test_user() -> Uuid {
        init_test_pool();

        let new_user = NewUser {
            name: "token repo user".to_string(),
            email: format!("token_repo_{}@example.com", Uuid::new_v4()),
            password_hash: "test_hash".to_string(),
            role: UserRole::User,
        };

        let user = UserRepository::create(&new_user).expect("Failed to create test user");
        user.id
    }

    fn new_token(user_id: Uuid, token_type: TokenType, ttl: Duration) -> NewToken {
        NewToken {
            user_id,
            token_type,
            token: format!("test_token_{}", Uuid::new_v4()),
            expires_at: Utc::now() + ttl,
            created_by_ip: Some("127.0.0.1".to_string()),
            user_agent: Some("tests".to_string()),
        }
    }

    #[test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    fn create_then_find_valid_returns_the_row() {
        let user_id = create_test_user();
        let new = new_token(user_id, TokenType::Access, Duration::minutes(15));

        let created = TokenRepository::create(&new).expect("create token");
        let found = TokenRepository::find_valid(&new.token, TokenType::Access)
            .expect("query")
            .expect("token should be live");

        assert_eq!(found.id, created.id);
        assert_eq!(found.user_id, user_id);

        let _ = UserRepository::delete(user_id);
    }

    #[test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    fn find_valid_rejects_wrong_type() {
        let user_id = create_test_user();
        let new = new_token(user_id, TokenType::Verification, Duration::hours(24));
        TokenRepository::create(&new).expect("create token");

        let found = TokenRepository::find_valid(&new.token, TokenType::Access).expect("query");
        assert!(found.is_none(), "Wrong-type lookup must read as not-found");

        let _ = UserRepository::delete(user_id);
    }

    #[test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    fn find_valid_rejects_expired_token() {
        let user_id = create_test_user();
        let new = new_token(user_id, TokenType::Refresh, Duration::seconds(-1));
        TokenRepository::create(&new).expect("create token");

        let found = TokenRepository::find_valid(&new.token, TokenType::Refresh).expect("query");
        assert!(found.is_none(), "Expired token must read as not-found");

        let _ = UserRepository::delete(user_id);
    }

    #[test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    fn revoke_marks_row_and_later_lookups_miss() {
        let user_id = create_test_user();
        let new = new_token(user_id, TokenType::Refresh, Duration::days(7));
        TokenRepository::create(&new).expect("create token");

        TokenRepository::revoke(&new.token, "10.0.0.1").expect("revoke");

        let row = TokenRepository::find_by_value(&new.token)
            .expect("query")
            .expect("row still exists");
        assert!(row.revoked_at.is_some());
        assert_eq!(row.revoked_by_ip.as_deref(), Some("10.0.0.1"));

        let found = TokenRepository::find_valid(&new.token, TokenType::Refresh).expect("query");
        assert!(found.is_none(), "Revoked token must read as not-found");

        let _ = UserRepository::delete(user_id);
    }

    #[test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    fn revoke_missing_token_is_a_noop() {
        init_test_pool();
        let result = TokenRepository::revoke("no_such_token", "10.0.0.1");
        assert!(result.is_ok());
    }

    #[test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    fn revoke_all_is_idempotent_and_keeps_first_revocation_ip() {
        let user_id = create_test_user();
        let access = new_token(user_id, TokenType::Access, Duration::minutes(15));
        let refresh = new_token(user_id, TokenType::Refresh, Duration::days(7));
        TokenRepository::create(&access).expect("create access");
        TokenRepository::create(&refresh).expect("create refresh");

        TokenRepository::revoke_all_for_user(user_id, "10.0.0.1").expect("first pass");
        TokenRepository::revoke_all_for_user(user_id, "10.0.0.2").expect("second pass");

        for value in [&access.token, &refresh.token] {
            let row = TokenRepository::find_by_value(value)
                .expect("query")
                .expect("row exists");
            assert!(row.revoked_at.is_some());
            assert_eq!(
                row.revoked_by_ip.as_deref(),
                Some("10.0.0.1"),
                "Second pass must not touch already-revoked rows"
            );
        }

        let _ = UserRepository::delete(user_id);
    }
}
