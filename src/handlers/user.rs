use axum::{
    Json,
    extract::Path,
    http::{HeaderMap, StatusCode},
};
use uuid::Uuid;

use crate::auth::extractors::AuthSession;
use crate::db::models::user::UserRole;
use crate::db::repositories::user_repository::UserRepository;
use crate::error::AppError;
use crate::handlers::cookies::renewed_access_cookie_headers;
use auth_service_api::UserResponse;

/// GET /users/me
/// Récupère le profil de l'utilisateur courant. Quand le guard a renouvelé
/// l'access token via le refresh token, le cookie est remplacé ici.
pub async fn get_current_user(
    session: AuthSession,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), AppError> {
    let headers = match session.renewed_access_token.as_deref() {
        Some(token) => renewed_access_cookie_headers(token)?,
        None => HeaderMap::new(),
    };

    Ok((StatusCode::OK, headers, Json(session.user.into())))
}

/// GET /users/{id}
/// Récupère un utilisateur par son ID (admin uniquement)
pub async fn get_user_by_id(
    Path(user_id): Path<Uuid>,
    session: AuthSession,
) -> Result<Json<UserResponse>, AppError> {
    session.require_role(UserRole::Admin)?;

    let user = UserRepository::find_by_id(user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

/// DELETE /users/{id}
/// Supprime un compte; autorisé pour soi-même ou un admin. Les tokens
/// du compte partent avec lui (cascade).
pub async fn delete_user(
    Path(user_id): Path<Uuid>,
    session: AuthSession,
) -> Result<StatusCode, AppError> {
    if session.user.id != user_id {
        session.require_role(UserRole::Admin)?;
    }

    UserRepository::delete(user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
