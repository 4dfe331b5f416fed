//! # Auth Module
//!
//! Password accounts and bearer tokens:
//! - registration (self-service and by an admin)
//! - login issuing HS256 JWTs
//! - the `AuthedUser` extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod validators;


pub use extractors::AuthedUser;
pub use models::{Role, User, UserOut};
pub use routes::auth_routes;
