//! Authentication routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/register` - Self-service registration
/// - `POST /api/auth/admin/create-user` - Account creation by an admin
/// - `POST /api/auth/login` - Email and password login
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/admin/create-user", post(handlers::admin_create_user))
        .route("/api/auth/login", post(handlers::login))
}
