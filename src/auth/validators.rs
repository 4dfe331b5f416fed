// src/auth/validators.rs

use super::models::{LoginRequest, RegisterRequest};
use crate::common::{ValidationResult, Validator};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_FULL_NAME_LENGTH: usize = 200;

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_email(&mut result, &data.email);
        validate_password(&mut result, &data.password);

        if let Some(full_name) = &data.full_name {
            if full_name.chars().count() > MAX_FULL_NAME_LENGTH {
                result.add_error("full_name", "Full name must be at most 200 characters");
            }
        }

        result
    }
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        }
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }
        result
    }
}

pub fn validate_email(result: &mut ValidationResult, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        result.add_error("email", "Email is required");
    } else if email.len() > MAX_EMAIL_LENGTH {
        result.add_error("email", "Email is too long");
    } else if !is_plausible_email(email) {
        result.add_error("email", "Invalid email format");
    }
}

pub fn validate_password(result: &mut ValidationResult, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        result.add_error("password", "Password must be at least 8 characters");
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
