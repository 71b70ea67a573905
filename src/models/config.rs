use crate::modules::supabase::SupabaseConfig;
use crate::proxy::ProxyConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub setup: SetupConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Setup-time RLS bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Shared secret for `/api/setup/disable-rls`; `None` disables the route
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_rls_table")]
    pub rls_table: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            secret: None,
            rls_table: default_rls_table(),
        }
    }
}

fn default_rls_table() -> String {
    "members".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for daily rolling log files; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
