// Middleware module - Axum middleware

pub mod auth;
pub mod cors;

pub use auth::{require_admin, require_authorization};
pub use cors::cors_layer;
