//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_APPLICANT: &str = "applicant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Applicant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Applicant => ROLE_APPLICANT,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_APPLICANT => Ok(Role::Applicant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub photo: Option<String>,
    pub role: String,
    pub created_at: Option<String>,
}

/// Public view of a user
#[derive(Serialize, Debug)]
pub struct UserOut {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub photo: Option<String>,
    pub role: String,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            photo: user.photo,
            role: user.role,
        }
    }
}

/// Body of `POST /api/auth/register` and `POST /api/auth/admin/create-user`
///
/// `photo` is a base64 image. `role` is only honoured for admin-created users.
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub photo: Option<String>,
    pub role: Option<Role>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
