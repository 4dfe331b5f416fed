// src/applicants/handlers.rs

use axum::extract::{Extension, Json, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{
    ApplicantProfile, ApplicationRequest, Gender, ProfileFields, ProfileSubmission,
};
use super::validators::ApplicationValidator;
use crate::auth::AuthedUser;
use crate::common::pagination::PageQueryValidator;
use crate::common::validation::parse_past_date;
use crate::common::{ApiError, AppState, Page, PageQuery, Validator};
use crate::uploads::{resolve_all, resolve_optional, BlobStore};

/// PUT /api/applications - Create or update the caller's application
pub async fn upsert_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<ApplicationRequest>,
) -> Result<Json<ApplicantProfile>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = ApplicationValidator.validate(&request);
    if !validation.is_valid {
        warn!(user_id = %authed.id, errors = validation.errors.len(), "Application rejected by validation");
        return Err(validation.into());
    }

    let submission = into_submission(request, &state.blob_store, state.max_upload_bytes)?;
    let profile = state.applicant_service.upsert(&authed.id, submission).await?;

    Ok(Json(profile))
}

/// GET /api/applications/me - The caller's application, or `null`
pub async fn get_my_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Option<ApplicantProfile>>, ApiError> {
    let state = state_lock.read().await.clone();
    let profile = state.applicant_service.find_by_owner(&authed.id).await?;
    Ok(Json(profile))
}

/// GET /api/applications - Paginated list of all applications (admin)
pub async fn list_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ApplicantProfile>>, ApiError> {
    if !authed.is_admin {
        warn!(user_id = %authed.id, "Application list access denied: admin privileges required");
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }

    let validation = PageQueryValidator.validate(&query);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await.clone();
    let page = state.applicant_service.search(&query).await?;

    info!(
        admin_user_id = %authed.id,
        total = page.total_count,
        page = page.page,
        "Applications listed"
    );

    Ok(Json(page))
}

/// Turns a validated request into the typed submission the service works on.
/// File fields are decoded here and nowhere else.
fn into_submission(
    request: ApplicationRequest,
    store: &BlobStore,
    max_upload_bytes: usize,
) -> Result<ProfileSubmission, ApiError> {
    let birth_date = request
        .birth_date
        .as_deref()
        .map(parse_past_date)
        .transpose()
        .map_err(|e| ApiError::ValidationError(format!("birth_date: {}", e)))?;
    let gender = request
        .gender
        .as_deref()
        .map(str::parse::<Gender>)
        .transpose()
        .map_err(ApiError::ValidationError)?;

    let profile_picture =
        resolve_optional(request.profile_picture.as_deref(), store, max_upload_bytes)?;
    let cv_files = request
        .cv_files
        .as_deref()
        .map(|files| resolve_all(files, store, max_upload_bytes))
        .transpose()?;

    Ok(ProfileSubmission {
        fields: ProfileFields {
            full_name: request.full_name.map(|v| v.trim().to_string()),
            birth_date,
            city: request.city.map(|v| v.trim().to_string()),
            country: request.country.map(|v| v.trim().to_string()),
            gender,
            education: request.education.map(|v| v.trim().to_string()),
        },
        profile_picture,
        cv_files,
    })
}
