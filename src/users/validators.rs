// src/users/validators.rs

use super::models::UpdateUserRequest;
use crate::auth::validators::validate_password;
use crate::common::validation::require_text;
use crate::common::{ValidationResult, Validator};

pub struct UpdateUserValidator;

impl Validator<UpdateUserRequest> for UpdateUserValidator {
    fn validate(&self, data: &UpdateUserRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(full_name) = &data.full_name {
            require_text(&mut result, "full_name", full_name, 200);
        }
        if let Some(password) = &data.password {
            validate_password(&mut result, password);
        }

        result
    }
}
