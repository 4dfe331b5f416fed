// src/applicants/routes.rs

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

pub fn applicants_routes() -> Router {
    Router::new()
        .route(
            "/api/applications",
            put(handlers::upsert_application).get(handlers::list_applications),
        )
        .route("/api/applications/me", get(handlers::get_my_application))
}
