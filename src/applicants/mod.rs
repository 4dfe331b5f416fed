// src/applicants/mod.rs
//! Applicant profiles: the application form, its files, and the admin listing.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use models::{ApplicantProfile, Gender};
pub use repository::{ApplicantRepository, SqliteApplicantRepository};
pub use routes::applicants_routes;
pub use services::{ApplicantError, ApplicantService};
