// src/uploads/handlers.rs

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::error::UploadError;
use crate::common::{ApiError, AppState};

/// GET /api/uploads/:namespace/:filename - Serve a stored blob
pub async fn serve_blob(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path((namespace, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state_lock.read().await.blob_store.clone();

    // Anything that is not a reference minted by the store is simply unknown
    let reference = store.lookup(&namespace, &filename).ok_or_else(|| {
        debug!(namespace = %namespace, filename = %filename, "Rejected blob lookup");
        ApiError::NotFound("File not found".to_string())
    })?;
    let format = store
        .format_of(&reference)
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let data = match store.read(&reference).await {
        Ok(data) => data,
        Err(UploadError::NotFound(_)) => {
            return Err(ApiError::NotFound("File not found".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", format.content_type()),
            ("Cache-Control", "private, max-age=3600"),
        ],
        data,
    ))
}
