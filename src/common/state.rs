// Application state shared across all modules

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::applicants::ApplicantService;
use crate::uploads::BlobStore;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub blob_store: Arc<BlobStore>,
    pub applicant_service: Arc<ApplicantService>,
    pub jwt_secret: String,
    pub jwt_expiry_minutes: i64,
    pub admin_emails: HashSet<String>,
    pub max_upload_bytes: usize,
}
