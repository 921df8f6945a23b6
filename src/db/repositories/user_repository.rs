use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, UpdateUser, User};
use crate::db::schema::{tokens, users};
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    /// Lookup by email. Callers normalize the email to lowercase before
    /// storage and lookup, so matching here is exact.
    pub fn find_by_email(email: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_id(id: Uuid) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        users::table
            .filter(users::id.eq(id))
            .first::<User>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn create(new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(users::table)
            .values(new_user)
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    pub fn set_email_verified(id: Uuid) -> Result<(), RepositoryError> {
        let changes = UpdateUser {
            email_verified: Some(true),
            updated_at: Some(Utc::now()),
        };

        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(&changes)
            .execute(&mut conn)?;

        Ok(())
    }

    /// Password reset consumption. The hash rotation, the revocation of the
    /// consumed reset token, and the defensive revocation of every other
    /// live token run in one transaction, so the reset token can never be
    /// consumed a second time around the update.
    pub fn reset_password(
        user_id: Uuid,
        new_password_hash: &str,
        used_token: &str,
        ip: &str,
    ) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let now = Utc::now();

            diesel::update(users::table.filter(users::id.eq(user_id)))
                .set((
                    users::password_hash.eq(new_password_hash),
                    users::updated_at.eq(now),
                ))
                .execute(conn)?;

            diesel::update(
                tokens::table
                    .filter(tokens::token.eq(used_token))
                    .filter(tokens::revoked_at.is_null()),
            )
            .set((tokens::revoked_at.eq(now), tokens::revoked_by_ip.eq(ip)))
            .execute(conn)?;

            diesel::update(
                tokens::table
                    .filter(tokens::user_id.eq(user_id))
                    .filter(tokens::revoked_at.is_null()),
            )
            .set((tokens::revoked_at.eq(now), tokens::revoked_by_ip.eq(ip)))
            .execute(conn)?;

            Ok(())
        })
    }

    /// Deletes the user row; the tokens table references users with
    /// ON DELETE CASCADE, so the user's tokens go with it.
    pub fn delete(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(users::table.filter(users::id.eq(id))).execute(&mut conn)?;

        Ok(())
    }
}
