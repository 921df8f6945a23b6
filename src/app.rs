// src/app.rs

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::services::AuthService;
use crate::handlers::auth::{
    forgot_password, login, logout, register, reset_password, verify_email,
};
use crate::handlers::health::health;
use crate::handlers::user::{delete_user, get_current_user, get_user_by_id};

/// Configure les routes d'authentification
pub fn auth_routes(auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/verify-email", post(verify_email))
        .with_state(auth_service)
}

/// Configure les routes utilisateur (protégées par le guard)
pub fn user_routes() -> Router {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/{id}", get(get_user_by_id))
        .route("/{id}", delete(delete_user))
}

/// Construit l'application complète
pub fn build_router(auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes(auth_service))
        .nest("/users", user_routes())
        // Middleware global de tracing
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::mailer::LogMailer;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use lambda_http::tower::ServiceExt; // for oneshot

    fn test_router() -> Router {
        let mailer = Arc::new(LogMailer::new("http://localhost:8080"));
        build_router(Arc::new(AuthService::new(mailer)))
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_rejects_weak_password_before_touching_the_store() {
        let body = serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "short1"
        });
        let req = Request::builder()
            .uri("/auth/register")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_rejects_malformed_email_before_touching_the_store() {
        let body = serde_json::json!({
            "name": "Alice",
            "email": "not-an-email",
            "password": "abcd1234"
        });
        let req = Request::builder()
            .uri("/auth/register")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_without_cookies_still_succeeds_and_clears_them() {
        let req = Request::builder()
            .uri("/auth/logout")
            .method("POST")
            .body(Body::empty())
            .unwrap();

        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let cleared: Vec<_> = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cleared.len(), 2);
        assert!(cleared.iter().all(|v| v.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn users_me_without_session_cookie_is_unauthorized_and_clears_cookies() {
        let req = Request::builder()
            .uri("/users/me")
            .body(Body::empty())
            .unwrap();

        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let cleared: Vec<_> = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cleared.len(), 2);
    }
}
