// src/users/routes.rs

use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers;

pub fn users_routes() -> Router {
    Router::new()
        .route(
            "/api/users/me",
            get(handlers::get_me).put(handlers::update_me),
        )
        .route("/api/users", get(handlers::list_unfinished_users))
        .route("/api/users/:id", delete(handlers::delete_user))
}
