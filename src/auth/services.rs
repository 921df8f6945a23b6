// src/auth/services.rs

use crate::error::AppError;
use auth_service_api::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    UserResponse, VerifyEmailRequest,
};
use std::sync::Arc;

use crate::auth::guard::SessionTokens;
use crate::auth::mailer::{EmailKind, Mailer};
use crate::auth::password::PasswordManager;
use crate::auth::tokens::{ClientInfo, TokenService};
use crate::db::error::RepositoryError;
use crate::db::models::token::TokenType;
use crate::db::models::user::{NewUser, UserRole};
use crate::db::repositories::user_repository::UserRepository;

/// The session credential pair minted by a successful login. The route
/// boundary turns these into cookies.
#[derive(Debug)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Registration: creates the (unverified) user and triggers the
    /// verification email. Does NOT log the user in.
    pub async fn register(
        &self,
        request: RegisterRequest,
        client: &ClientInfo,
    ) -> Result<RegisterResponse, AppError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name, email, and password are required"));
        }

        let email = request.email.trim().to_lowercase();
        if !Self::is_valid_email(&email) {
            return Err(AppError::InvalidEmail);
        }

        Self::check_password_policy(&request.password)?;

        // Explicit presence check; the unique index still backs us up
        // against concurrent registrations.
        if UserRepository::find_by_email(&email)?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = PasswordManager::hash(&request.password)?;

        let new_user = NewUser {
            name: name.to_string(),
            email,
            password_hash,
            role: UserRole::User,
        };
        let user = match UserRepository::create(&new_user) {
            Ok(user) => user,
            Err(RepositoryError::UniqueViolation(_)) => return Err(AppError::UserAlreadyExists),
            Err(e) => return Err(e.into()),
        };

        let verification_token =
            TokenService::issue(user.id, TokenType::Verification, client, None)?;

        // Best-effort: the user and token are already committed, a failed
        // send must not roll them back.
        if let Err(e) = self
            .mailer
            .send(EmailKind::Verify, &user.email, &verification_token)
            .await
        {
            tracing::warn!(user_id = %user.id, "Verification email failed: {e}");
        }

        Ok(RegisterResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            message: "Registration successful! Please check your email to verify your account."
                .to_string(),
        })
    }

    /// Login: verifies credentials and mints the access/refresh pair.
    pub fn login(
        &self,
        request: &LoginRequest,
        client: &ClientInfo,
    ) -> Result<(UserResponse, LoginTokens), AppError> {
        let email = request.email.trim().to_lowercase();

        // Unknown email and wrong password must stay indistinguishable.
        let Some(user) = UserRepository::find_by_email(&email)? else {
            return Err(AppError::InvalidCredentials);
        };

        // Checked before the password; deliberately distinguishable (403).
        if !user.email_verified {
            return Err(AppError::EmailNotVerified);
        }

        if !PasswordManager::verify(&request.password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = TokenService::issue(user.id, TokenType::Access, client, None)?;
        let refresh_token = TokenService::issue(user.id, TokenType::Refresh, client, None)?;

        Ok((
            user.into(),
            LoginTokens {
                access_token,
                refresh_token,
            },
        ))
    }

    /// Logout: revokes whichever session tokens the request presented.
    /// Never fails: the client-side logout must succeed even when
    /// revocation does not.
    pub fn logout(&self, tokens: &SessionTokens, client: &ClientInfo) {
        let present = [
            tokens.access_token.as_deref(),
            tokens.refresh_token.as_deref(),
        ];
        for token in present.into_iter().flatten() {
            if let Err(e) = TokenService::revoke(token, &client.ip) {
                tracing::warn!("Token revocation during logout failed: {e}");
            }
        }
    }

    /// Forgot-password: issues a reset token and sends the email only when
    /// the account exists; the caller always gets the same generic reply.
    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }

        if let Some(user) = UserRepository::find_by_email(&email)? {
            let reset_token =
                TokenService::issue(user.id, TokenType::PasswordReset, client, None)?;

            if let Err(e) = self
                .mailer
                .send(EmailKind::Reset, &user.email, &reset_token)
                .await
            {
                tracing::warn!(user_id = %user.id, "Password reset email failed: {e}");
            }
        }

        Ok(())
    }

    /// Reset-password: consumes a reset token. Hash rotation, token
    /// consumption, and the defensive revoke-all run atomically in the
    /// repository.
    pub fn reset_password(
        &self,
        request: &ResetPasswordRequest,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        Self::check_password_policy(&request.password)?;

        let record = TokenService::verify(&request.token, TokenType::PasswordReset)?
            .ok_or(AppError::InvalidToken)?;

        let new_hash = PasswordManager::hash(&request.password)?;
        UserRepository::reset_password(record.user_id, &new_hash, &request.token, &client.ip)?;

        Ok(())
    }

    /// Verify-email: single-use consumption of a verification token.
    pub fn verify_email(
        &self,
        request: &VerifyEmailRequest,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let record = TokenService::verify(&request.token, TokenType::Verification)?
            .ok_or(AppError::InvalidToken)?;

        UserRepository::set_email_verified(record.user_id)?;
        TokenService::revoke(&request.token, &client.ip)?;

        Ok(())
    }

    // === Validation helpers ===

    fn is_valid_email(email: &str) -> bool {
        email.contains('@') && email.contains('.') && email.len() > 5
    }

    /// Minimum 8 characters, at least one letter and one digit.
    fn check_password_policy(password: &str) -> Result<(), AppError> {
        let long_enough = password.len() >= 8;
        let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if long_enough && has_letter && has_digit {
            Ok(())
        } else {
            Err(AppError::WeakPassword(
                "Password must be at least 8 characters long and contain at least one letter and one number"
                    .to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::mailer::LogMailer;
    use crate::auth::mailer::test_support::FailingMailer;
    use crate::db::connection::init_test_pool;
    use uuid::Uuid;

    fn log_mailer() -> Arc<LogMailer> {
        Arc::new(LogMailer::new("http://localhost:8080"))
    }

    fn localhost() -> ClientInfo {
        ClientInfo {
            ip: "127.0.0.1".to_string(),
            user_agent: Some("tests".to_string()),
        }
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: format!("alice_{}@example.com", Uuid::new_v4()),
            password: "abcd1234".to_string(),
        }
    }

    #[test]
    fn password_policy_accepts_letters_and_digits() {
        assert!(AuthService::check_password_policy("abcd1234").is_ok());
    }

    #[test]
    fn password_policy_rejects_short_passwords() {
        assert!(AuthService::check_password_policy("ab12").is_err());
    }

    #[test]
    fn password_policy_rejects_all_letters() {
        assert!(AuthService::check_password_policy("abcdefgh").is_err());
    }

    #[test]
    fn password_policy_rejects_all_digits() {
        assert!(AuthService::check_password_policy("12345678").is_err());
    }

    #[test]
    fn email_validation_rejects_obviously_malformed_addresses() {
        assert!(AuthService::is_valid_email("alice@example.com"));
        assert!(!AuthService::is_valid_email("not-an-email"));
        assert!(!AuthService::is_valid_email("a@b"));
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn register_lowercases_email_and_starts_unverified() {
        init_test_pool();
        let service = AuthService::new(log_mailer());

        let mut request = register_request();
        request.email = request.email.to_uppercase();
        let expected_email = request.email.to_lowercase();

        let response = service
            .register(request, &localhost())
            .await
            .expect("register");
        assert_eq!(response.email, expected_email);

        let stored = UserRepository::find_by_email(&expected_email)
            .expect("query")
            .expect("user exists");
        assert!(!stored.email_verified);
        assert_eq!(stored.role, UserRole::User);

        let _ = UserRepository::delete(response.id);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn register_survives_a_mail_outage() {
        init_test_pool();
        let service = AuthService::new(Arc::new(FailingMailer));

        let request = register_request();
        let email = request.email.clone();

        let response = service
            .register(request, &localhost())
            .await
            .expect("register must succeed despite the failed send");

        let stored = UserRepository::find_by_email(&email).expect("query");
        assert!(stored.is_some(), "User row must have been committed");

        let _ = UserRepository::delete(response.id);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn duplicate_email_is_rejected_on_second_register() {
        init_test_pool();
        let service = AuthService::new(log_mailer());

        let request = register_request();
        let first = service
            .register(request.clone(), &localhost())
            .await
            .expect("first register");

        let second = service.register(request, &localhost()).await;
        assert!(matches!(second, Err(AppError::UserAlreadyExists)));

        let _ = UserRepository::delete(first.id);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn login_is_blocked_until_email_verification_then_succeeds() {
        use crate::db::repositories::token_repository::TokenRepository;

        init_test_pool();
        let mailer = log_mailer();
        let service = AuthService::new(mailer);

        let request = register_request();
        let email = request.email.clone();
        let password = request.password.clone();
        let registered = service
            .register(request, &localhost())
            .await
            .expect("register");

        let login_request = LoginRequest {
            email: email.clone(),
            password: password.clone(),
        };

        // Before verification: a deliberately distinguishable rejection.
        let blocked = service.login(&login_request, &localhost());
        assert!(matches!(blocked, Err(AppError::EmailNotVerified)));

        // Consume the verification token issued during registration.
        let stored = UserRepository::find_by_email(&email)
            .expect("query")
            .expect("user exists");
        let verification = latest_token_for(stored.id, TokenType::Verification);
        service
            .verify_email(
                &VerifyEmailRequest {
                    token: verification.clone(),
                },
                &localhost(),
            )
            .expect("verify email");

        // Second consumption must fail: single use.
        let again = service.verify_email(
            &VerifyEmailRequest {
                token: verification,
            },
            &localhost(),
        );
        assert!(matches!(again, Err(AppError::InvalidToken)));

        // After verification the same credentials log in.
        let (user, tokens) = service
            .login(&login_request, &localhost())
            .expect("login after verification");
        assert_eq!(user.email, email);
        assert!(
            TokenService::verify(&tokens.access_token, TokenType::Access)
                .expect("verify")
                .is_some()
        );
        assert!(
            TokenService::verify(&tokens.refresh_token, TokenType::Refresh)
                .expect("verify")
                .is_some()
        );

        let _ = TokenRepository::revoke_all_for_user(registered.id, "127.0.0.1");
        let _ = UserRepository::delete(registered.id);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        init_test_pool();
        let service = AuthService::new(log_mailer());

        let request = register_request();
        let email = request.email.clone();
        let registered = service
            .register(request, &localhost())
            .await
            .expect("register");
        UserRepository::set_email_verified(registered.id).expect("verify");

        let wrong_password = service.login(
            &LoginRequest {
                email,
                password: "wrong4567".to_string(),
            },
            &localhost(),
        );
        let unknown_email = service.login(
            &LoginRequest {
                email: "missing@example.com".to_string(),
                password: "whatever1".to_string(),
            },
            &localhost(),
        );

        // Same variant → same status code and byte-identical body.
        assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AppError::InvalidCredentials)));

        let _ = UserRepository::delete(registered.id);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn reset_password_consumes_the_token_and_kills_open_sessions() {
        init_test_pool();
        let service = AuthService::new(log_mailer());

        let request = register_request();
        let email = request.email.clone();
        let registered = service
            .register(request, &localhost())
            .await
            .expect("register");
        UserRepository::set_email_verified(registered.id).expect("verify");

        // Open a session, then request a reset.
        let (_, session) = service
            .login(
                &LoginRequest {
                    email: email.clone(),
                    password: "abcd1234".to_string(),
                },
                &localhost(),
            )
            .expect("login");
        service
            .forgot_password(&ForgotPasswordRequest { email: email.clone() }, &localhost())
            .await
            .expect("forgot password");

        let reset_token = latest_token_for(registered.id, TokenType::PasswordReset);
        service
            .reset_password(
                &ResetPasswordRequest {
                    token: reset_token.clone(),
                    password: "newpass99".to_string(),
                },
                &localhost(),
            )
            .expect("reset");

        // The reset token is single use.
        let again = service.reset_password(
            &ResetPasswordRequest {
                token: reset_token,
                password: "other1234".to_string(),
            },
            &localhost(),
        );
        assert!(matches!(again, Err(AppError::InvalidToken)));

        // The pre-reset session is dead.
        assert!(
            TokenService::verify(&session.refresh_token, TokenType::Refresh)
                .expect("verify")
                .is_none()
        );

        // Old password out, new password in.
        assert!(matches!(
            service.login(
                &LoginRequest {
                    email: email.clone(),
                    password: "abcd1234".to_string(),
                },
                &localhost(),
            ),
            Err(AppError::InvalidCredentials)
        ));
        assert!(
            service
                .login(
                    &LoginRequest {
                        email,
                        password: "newpass99".to_string(),
                    },
                    &localhost(),
                )
                .is_ok()
        );

        let _ = UserRepository::delete(registered.id);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres (DATABASE_URL)"]
    async fn forgot_password_is_silent_about_unknown_emails() {
        init_test_pool();
        let mailer = log_mailer();
        let service = AuthService::new(mailer.clone());

        let before = mailer.sent_count();
        service
            .forgot_password(
                &ForgotPasswordRequest {
                    email: format!("ghost_{}@example.com", Uuid::new_v4()),
                },
                &localhost(),
            )
            .await
            .expect("must still report success");
        assert_eq!(mailer.sent_count(), before, "No email for unknown accounts");
    }

    /// Fetches the newest live token of a type for a user, straight from
    /// the store, since the service only ever emails the raw value out.
    fn latest_token_for(user_id: Uuid, token_type: TokenType) -> String {
        use crate::db::connection::get_connection;
        use crate::db::schema::tokens;
        use diesel::prelude::*;

        let mut conn = get_connection().expect("connection");
        tokens::table
            .filter(tokens::user_id.eq(user_id))
            .filter(tokens::token_type.eq(token_type))
            .filter(tokens::revoked_at.is_null())
            .order(tokens::created_at.desc())
            .select(tokens::token)
            .first::<String>(&mut conn)
            .expect("token exists")
    }
}
