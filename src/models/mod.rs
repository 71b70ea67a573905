pub mod api;
pub mod config;
pub mod member;

pub use api::*;
pub use config::*;
pub use member::*;
