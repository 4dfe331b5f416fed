//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{Claims, LoginRequest, RegisterRequest, Role, TokenResponse, User, UserOut};
use super::password::{hash_password, verify_password};
use super::validators::{LoginValidator, RegisterValidator};
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState, Validator};
use crate::uploads::{resolve_optional, BlobKind, SlotPlan};

/// POST /api/auth/register
/// Self-service registration. Emails listed in `ADMIN_EMAILS` become admins.
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let state = state_lock.read().await.clone();

    let role = if state
        .admin_emails
        .contains(&request.email.trim().to_lowercase())
    {
        Role::Admin
    } else {
        Role::Applicant
    };

    let user = create_account(&state, request, role).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/admin/create-user
/// Admin-only account creation with an explicit role.
pub async fn admin_create_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    if !authed.is_admin {
        warn!(user_id = %authed.id, "User creation denied: admin privileges required");
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }

    let state = state_lock.read().await.clone();
    let role = request.role.unwrap_or_default();
    let user = create_account(&state, request, role).await?;

    info!(admin_user_id = %authed.id, user_id = %user.id, role = %user.role, "User created by admin");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login
/// Exchanges email and password for a bearer token.
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = LoginValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let email = request.email.trim().to_lowercase();
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let user = match user {
        Some(u) if verify_password(&request.password, &u.password_hash) => u,
        _ => {
            warn!(email = %safe_email_log(&email), "Login failed: invalid credentials");
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }
    };

    let access_token = issue_token(
        &user.id,
        &user.role,
        &state.jwt_secret,
        state.jwt_expiry_minutes,
    )?;

    info!(user_id = %user.id, email = %safe_email_log(&user.email), "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Signs an HS256 token for `user_id` that expires after `expiry_minutes`.
pub fn issue_token(
    user_id: &str,
    role: &str,
    secret: &str,
    expiry_minutes: i64,
) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::minutes(expiry_minutes)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "Failed to encode JWT");
        ApiError::InternalServer("Failed to issue token".to_string())
    })
}

async fn create_account(
    state: &AppState,
    request: RegisterRequest,
    role: Role,
) -> Result<User, ApiError> {
    let validation = RegisterValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let email = request.email.trim().to_lowercase();

    let taken: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    if taken.is_some() {
        warn!(email = %safe_email_log(&email), "Registration rejected: email already in use");
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let password_hash = hash_password(&request.password)?;

    // A new account owns no blobs yet, so only a fresh image is accepted
    let photo = resolve_optional(
        request.photo.as_deref(),
        &state.blob_store,
        state.max_upload_bytes,
    )?;
    let photo = SlotPlan::new(None, photo, BlobKind::Image)?
        .persist(&state.blob_store)
        .await?;

    let user_id = generate_user_id();
    let full_name = request
        .full_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let inserted = sqlx::query(
        "INSERT INTO users (id, email, password_hash, full_name, photo, role) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(&email)
    .bind(&password_hash)
    .bind(&full_name)
    .bind(photo.value().map(|r| r.as_str()))
    .bind(role.as_str())
    .execute(&state.db)
    .await;

    if let Err(e) = inserted {
        photo.abort(&state.blob_store).await;
        return Err(match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("Email is already registered".to_string())
            }
            other => ApiError::DatabaseError(other),
        });
    }
    photo.commit(&state.blob_store).await;

    info!(
        user_id = %user_id,
        email = %safe_email_log(&email),
        role = %role.as_str(),
        "User registered"
    );

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)
}
