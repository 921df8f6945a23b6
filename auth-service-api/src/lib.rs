//! # auth-service-api
//!
//! Shared API types for the auth-service backend.
//! This crate is designed to be WASM-compatible and can be used in both
//! backend (Rust) and frontend (WASM/TypeScript via wasm-bindgen) applications.
//!
//! ## Features
//!
//! - Request DTOs (RegisterRequest, LoginRequest, ResetPasswordRequest, etc.)
//! - Response DTOs (UserResponse, RegisterResponse, MessageResponse)
//! - Error response format (ErrorResponse)
//!
//! ## Example
//!
//! ```rust
//! use auth_service_api::LoginRequest;
//!
//! let request = LoginRequest {
//!     email: "user@example.com".to_string(),
//!     password: "password123".to_string(),
//! };
//! ```

pub mod error;
pub mod requests;
pub mod responses;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
