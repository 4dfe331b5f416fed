// src/users/handlers.rs

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{MessageResponse, UpdateUserRequest, UserNameAndPhoto};
use super::validators::UpdateUserValidator;
use crate::auth::models::ROLE_APPLICANT;
use crate::auth::password::hash_password;
use crate::auth::{AuthedUser, User, UserOut};
use crate::common::pagination::PageQueryValidator;
use crate::common::{ApiError, AppState, Page, PageQuery, Validator};
use crate::uploads::{resolve_optional, BlobKind, SlotPlan};

async fn load_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// GET /api/users/me - Name and photo of the caller
pub async fn get_me(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<UserNameAndPhoto>, ApiError> {
    let state = state_lock.read().await.clone();
    let user = load_user(&state, &authed.id).await?;

    Ok(Json(UserNameAndPhoto {
        full_name: user.full_name,
        photo: user.photo,
    }))
}

/// PUT /api/users/me - Update name, password or photo
pub async fn update_me(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserNameAndPhoto>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = UpdateUserValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let user = load_user(&state, &authed.id).await?;
    let current_photo = user
        .photo
        .as_deref()
        .and_then(|p| state.blob_store.recognize(p));

    let incoming = resolve_optional(
        request.photo.as_deref(),
        &state.blob_store,
        state.max_upload_bytes,
    )?;
    let photo = SlotPlan::new(current_photo.as_ref(), incoming, BlobKind::Image)?;
    let password_hash = request
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;
    let full_name = request.full_name.map(|n| n.trim().to_string());

    let photo = photo.persist(&state.blob_store).await?;
    // Keep whatever was stored when the slot is unchanged, even if it is not
    // a reference this store recognises
    let photo_value = match photo.value() {
        Some(reference) => Some(reference.as_str().to_string()),
        None => user.photo.clone(),
    };

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET full_name = COALESCE(?, full_name),
            password_hash = COALESCE(?, password_hash),
            photo = ?
        WHERE id = ?
        "#,
    )
    .bind(&full_name)
    .bind(&password_hash)
    .bind(&photo_value)
    .bind(&authed.id)
    .execute(&state.db)
    .await;

    if let Err(e) = updated {
        error!(error = %e, user_id = %authed.id, "Failed to update user");
        photo.abort(&state.blob_store).await;
        return Err(ApiError::DatabaseError(e));
    }
    photo.commit(&state.blob_store).await;

    info!(
        user_id = %authed.id,
        name_changed = full_name.is_some(),
        password_changed = password_hash.is_some(),
        "User updated"
    );

    let user = load_user(&state, &authed.id).await?;
    Ok(Json(UserNameAndPhoto {
        full_name: user.full_name,
        photo: user.photo,
    }))
}

/// GET /api/users - Applicants who have not submitted an application (admin)
pub async fn list_unfinished_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserOut>>, ApiError> {
    if !authed.is_admin {
        warn!(user_id = %authed.id, "User list access denied: admin privileges required");
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }

    let validation = PageQueryValidator.validate(&query);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await.clone();
    let pattern = query.name_pattern();

    let (total,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM users u
        LEFT JOIN applicants a ON a.user_id = u.id
        WHERE a.id IS NULL
          AND u.role = ?1
          AND (?2 IS NULL OR LOWER(u.full_name) LIKE ?2)
        "#,
    )
    .bind(ROLE_APPLICANT)
    .bind(&pattern)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        LEFT JOIN applicants a ON a.user_id = u.id
        WHERE a.id IS NULL
          AND u.role = ?1
          AND (?2 IS NULL OR LOWER(u.full_name) LIKE ?2)
        ORDER BY u.created_at DESC, u.id
        LIMIT ?3 OFFSET ?4
        "#,
    )
    .bind(ROLE_APPLICANT)
    .bind(&pattern)
    .bind(query.limit())
    .bind(query.offset())
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let items = users.into_iter().map(UserOut::from).collect();
    Ok(Json(Page::new(items, total, &query)))
}

/// DELETE /api/users/:id - Remove a user with their application and files (admin)
pub async fn delete_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !authed.is_admin {
        warn!(user_id = %authed.id, target_user_id = %user_id, "User deletion denied: admin privileges required");
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }
    if authed.id == user_id {
        return Err(ApiError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();
    let user = load_user(&state, &user_id).await?;

    let had_application = state.applicant_service.delete_by_owner(&user_id).await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if let Some(photo) = user
        .photo
        .as_deref()
        .and_then(|p| state.blob_store.recognize(p))
    {
        state.blob_store.delete_best_effort(&photo).await;
    }

    info!(
        admin_user_id = %authed.id,
        deleted_user_id = %user_id,
        had_application = had_application,
        "User deleted"
    );

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
