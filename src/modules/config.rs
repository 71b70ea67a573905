use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const CONFIG_FILE: &str = "config.json";
const CONFIG_PATH_ENV: &str = "CHURCH_PORTAL_CONFIG";

/// Load application config: optional JSON file, then environment overrides
pub fn load_app_config() -> AppResult<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));

    let config = load_config_file(&path)?;
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

fn load_config_file(path: &Path) -> AppResult<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
}

/// Apply environment overrides; `get` is injected so tests need not touch the process env
pub fn apply_env_overrides<F>(mut config: AppConfig, get: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

    if let Some(public_url) = get("NEXT_PUBLIC_API_URL") {
        config.proxy.public_api_url = Some(public_url);
    }
    if let Some(api_url) = get("API_URL").or_else(|| get("NEXT_PUBLIC_API_URL")) {
        config.proxy.api_url = api_url;
    }
    if let Some(host) = get("HOST") {
        config.proxy.host = Some(host);
    }
    if let Some(port) = get("PORT") {
        match port.parse() {
            Ok(port) => config.proxy.port = port,
            Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
        }
    }

    if let Some(url) = get("SUPABASE_URL").or_else(|| get("NEXT_PUBLIC_SUPABASE_URL")) {
        config.supabase.url = url;
    }
    if let Some(key) = get("SUPABASE_ANON_KEY").or_else(|| get("NEXT_PUBLIC_SUPABASE_ANON_KEY")) {
        config.supabase.anon_key = key;
    }
    if let Some(key) = get("SUPABASE_SERVICE_ROLE_KEY") {
        config.supabase.service_role_key = Some(key);
    }

    if let Some(secret) = get("SETUP_SECRET") {
        config.setup.secret = Some(secret);
    }

    if let Some(dir) = get("LOG_DIR") {
        config.log.dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.log.level = level;
    }

    config
}

pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    check_http_url("api_url", &config.proxy.backend_base_url())?;
    check_http_url("supabase.url", &config.supabase.url)?;
    if config.setup.rls_table.trim().is_empty() {
        return Err(AppError::Config("setup.rls_table must not be empty".to_string()));
    }
    Ok(())
}

fn check_http_url(name: &str, value: &str) -> AppResult<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| AppError::Config(format!("{} is not a valid URL ({}): {}", name, value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::Config(format!(
            "{} must use http or https, got {}",
            name, other
        ))),
    }
}
