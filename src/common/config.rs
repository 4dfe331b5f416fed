// src/common/config.rs
//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::uploads::EmptyDocumentsPolicy;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub uploads_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiry_minutes: i64,
    pub admin_emails: HashSet<String>,
    pub empty_documents_policy: EmptyDocumentsPolicy,
    pub max_upload_bytes: usize,
    /// Limit on a whole request body, base64 overhead included
    pub max_request_bytes: usize,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://applicants.db".to_string());
        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./static/uploads".to_string());
        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());

        let jwt_expiry_minutes = env::var("JWT_EXPIRY_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(30);

        let admin_emails = parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default());

        let empty_documents_policy = match env::var("EMPTY_DOCUMENTS_POLICY") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Unknown EMPTY_DOCUMENTS_POLICY, falling back to 'clear'");
                EmptyDocumentsPolicy::default()
            }),
            Err(_) => EmptyDocumentsPolicy::default(),
        };

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let max_request_bytes = env::var("MAX_REQUEST_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_REQUEST_BYTES);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        Self {
            database_url,
            uploads_dir: PathBuf::from(uploads_dir),
            jwt_secret,
            jwt_expiry_minutes,
            admin_emails,
            empty_documents_policy,
            max_upload_bytes,
            max_request_bytes,
            cors_origins,
            port,
        }
    }
}

/// Parses a comma-separated list of admin emails, normalised to lowercase
pub fn parse_admin_emails(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
