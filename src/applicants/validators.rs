// src/applicants/validators.rs

use super::models::{ApplicationRequest, Gender};
use crate::common::validation::{parse_past_date, require_text};
use crate::common::{ValidationResult, Validator};

pub const MAX_FULL_NAME_LENGTH: usize = 200;
const MAX_TEXT_LENGTH: usize = 200;
const MAX_EDUCATION_LENGTH: usize = 1000;

/// Checks the fields that were submitted. Whether a field is required at all
/// depends on the profile already existing, which the service decides.
pub struct ApplicationValidator;

impl Validator<ApplicationRequest> for ApplicationValidator {
    fn validate(&self, data: &ApplicationRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(full_name) = &data.full_name {
            require_text(&mut result, "full_name", full_name, MAX_FULL_NAME_LENGTH);
        }
        if let Some(city) = &data.city {
            require_text(&mut result, "city", city, MAX_TEXT_LENGTH);
        }
        if let Some(country) = &data.country {
            require_text(&mut result, "country", country, MAX_TEXT_LENGTH);
        }
        if let Some(education) = &data.education {
            require_text(&mut result, "education", education, MAX_EDUCATION_LENGTH);
        }

        if let Some(birth_date) = &data.birth_date {
            if let Err(message) = parse_past_date(birth_date) {
                result.add_error("birth_date", message);
            }
        }

        if let Some(gender) = &data.gender {
            if gender.parse::<Gender>().is_err() {
                result.add_error("gender", "Gender must be one of: male, female, other");
            }
        }

        result
    }
}
