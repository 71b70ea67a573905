// proxy module - gateway HTTP surface

pub mod config;
pub mod server;

pub mod handlers; // API endpoint handlers
pub mod middleware; // Axum middleware
pub mod upstream; // Backend API client

pub use config::ProxyConfig;
pub use server::{build_router, AppState, AxumServer};
