// Common validation types and traits

use chrono::{NaiveDate, Utc};

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Requires a trimmed, non-empty value no longer than `max_len` characters.
pub fn require_text(result: &mut ValidationResult, field: &str, value: &str, max_len: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        result.add_error(field, "Field is required");
    } else if trimmed.chars().count() > max_len {
        result.add_error(
            field,
            &format!("Field must be at most {} characters", max_len),
        );
    }
}

/// Parses a `YYYY-MM-DD` date that must not lie in the future.
pub fn parse_past_date(value: &str) -> Result<NaiveDate, &'static str> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| "Date must be in YYYY-MM-DD format")?;
    if date > Utc::now().date_naive() {
        return Err("Date cannot be in the future");
    }
    Ok(date)
}
