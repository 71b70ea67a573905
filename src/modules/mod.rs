pub mod config;
pub mod db;
pub mod logger;
pub mod password;
pub mod supabase;

#[cfg(test)]
pub mod mock;

pub use config::load_app_config;
pub use db::{IdentityProvider, MemberStore, RemoteProcedures};
pub use supabase::{SupabaseClient, SupabaseConfig, SupabaseError};
