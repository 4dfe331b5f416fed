// src/main.rs
use axum::{
    extract::{DefaultBodyLimit, Extension},
    middleware, Router,
};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod applicants;
mod auth;
mod common;
mod logging_middleware;
mod uploads;
mod users;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use applicants::{ApplicantService, SqliteApplicantRepository};
use common::{AppConfig, AppState};
use uploads::{BlobStore, BlobStoreConfig};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    info!(
        admin_emails = config.admin_emails.len(),
        uploads_dir = %config.uploads_dir.display(),
        empty_documents_policy = ?config.empty_documents_policy,
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let blob_store = Arc::new(
        BlobStore::open(BlobStoreConfig {
            root: config.uploads_dir.clone(),
        })
        .await?,
    );

    let applicant_service = Arc::new(ApplicantService::new(
        Arc::new(SqliteApplicantRepository::new(pool.clone())),
        blob_store.clone(),
        config.empty_documents_policy,
    ));
    info!("ApplicantService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        blob_store,
        applicant_service,
        jwt_secret: config.jwt_secret.clone(),
        jwt_expiry_minutes: config.jwt_expiry_minutes,
        admin_emails: config.admin_emails.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let app = build_router(shared, &config.cors_origins, config.max_request_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

fn build_router(
    shared: Arc<RwLock<AppState>>,
    cors_origins: &[String],
    max_request_bytes: usize,
) -> Router {
    Router::new()
        // Registration and login
        .merge(auth::auth_routes())
        // Current user and admin user management
        .merge(users::users_routes())
        // Application form
        .merge(applicants::applicants_routes())
        // Stored images and documents
        .merge(uploads::uploads_routes())
        // Request/response body logging at debug level
        .layer(middleware::from_fn_with_state(
            max_request_bytes,
            logging_middleware::log_request_response,
        ))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(Extension(shared))
        .layer({
            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http())
}
