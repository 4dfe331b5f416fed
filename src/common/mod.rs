// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod pagination;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{safe_email_log, truncate_for_log};
pub use id_generator::*;
pub use pagination::{Page, PageQuery};
pub use state::AppState;
pub use validation::{ValidationError, ValidationResult, Validator};
