// src/handlers/auth.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

use crate::auth::guard::SessionTokens;
use crate::auth::services::AuthService;
use crate::auth::tokens::ClientInfo;
use crate::error::AppError;
use crate::handlers::cookies::{
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, clear_session_cookie_headers, cookie_value,
    session_cookie_headers,
};
use auth_service_api::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, RegisterResponse,
    ResetPasswordRequest, UserResponse, VerifyEmailRequest,
};

/// POST /auth/register
/// Inscription d'un nouvel utilisateur
pub async fn register(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let client = ClientInfo::from_headers(&headers);
    let response = auth_service.register(payload, &client).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
/// Connexion d'un utilisateur
pub async fn login(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), AppError> {
    let client = ClientInfo::from_headers(&headers);
    let (user, tokens) = auth_service.login(&payload, &client)?;

    let out_headers = session_cookie_headers(&tokens.access_token, &tokens.refresh_token)?;
    Ok((StatusCode::OK, out_headers, Json(user)))
}

/// POST /auth/logout
/// Déconnexion: révoque les tokens présentés puis efface les cookies,
/// même si la révocation échoue côté serveur.
pub async fn logout(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<MessageResponse>) {
    let client = ClientInfo::from_headers(&headers);
    let tokens = SessionTokens {
        access_token: cookie_value(&headers, ACCESS_TOKEN_COOKIE),
        refresh_token: cookie_value(&headers, REFRESH_TOKEN_COOKIE),
    };

    auth_service.logout(&tokens, &client);

    (
        StatusCode::OK,
        clear_session_cookie_headers(),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// POST /auth/forgot-password
/// Même réponse générique que l'email existe ou non (anti-énumération)
pub async fn forgot_password(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let client = ClientInfo::from_headers(&headers);
    auth_service.forgot_password(&payload, &client).await?;

    Ok(Json(MessageResponse::new(
        "If this email is registered, you will receive a password reset link",
    )))
}

/// POST /auth/reset-password
/// Consomme un token de réinitialisation valide
pub async fn reset_password(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let client = ClientInfo::from_headers(&headers);
    auth_service.reset_password(&payload, &client)?;

    Ok(Json(MessageResponse::new(
        "Password has been reset successfully",
    )))
}

/// POST /auth/verify-email
/// Consomme un token de vérification (usage unique)
pub async fn verify_email(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let client = ClientInfo::from_headers(&headers);
    auth_service.verify_email(&payload, &client)?;

    Ok(Json(MessageResponse::new("Email verified successfully")))
}
