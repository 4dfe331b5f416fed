// src/users/models.rs

use serde::{Deserialize, Serialize};

/// Response of `GET /api/users/me`
#[derive(Debug, Serialize)]
pub struct UserNameAndPhoto {
    pub full_name: Option<String>,
    pub photo: Option<String>,
}

/// Body of `PUT /api/users/me`; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
