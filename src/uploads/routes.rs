// src/uploads/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn uploads_routes() -> Router {
    Router::new().route("/api/uploads/:namespace/:filename", get(handlers::serve_blob))
}
