// RLS bootstrap endpoint (setup-time only)
use axum::{
    extract::{RawQuery, State},
    response::Json,
};
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};
use crate::models::ApiSuccess;
use crate::modules::db;
use crate::proxy::server::AppState;

/// The `key` query parameter; absent or repeated keys yield `None`
pub fn setup_key(query: Option<&str>) -> Option<String> {
    let mut keys = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .filter(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned());
    match (keys.next(), keys.next()) {
        (Some(key), None) => Some(key),
        _ => None,
    }
}

/// Compare secrets via their SHA-256 digests so timing does not depend on where they differ
pub fn secret_matches(expected: &str, provided: &str) -> bool {
    let a = Sha256::digest(expected.as_bytes());
    let b = Sha256::digest(provided.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// GET /api/setup/disable-rls?key=...
pub async fn handle_disable_rls(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ApiSuccess<serde_json::Map<String, serde_json::Value>>>> {
    let Some(expected) = state.setup.secret.as_deref() else {
        tracing::warn!("Setup endpoint called but SETUP_SECRET is not configured");
        return Err(AppError::Unauthorized);
    };

    let provided = setup_key(query.as_deref()).unwrap_or_default();
    if provided.is_empty() || !secret_matches(expected, &provided) {
        return Err(AppError::Unauthorized);
    }

    db::disable_rls_with_bootstrap(state.rpc.as_ref(), &state.setup.rls_table).await?;
    tracing::info!("Row level security disabled on {}", state.setup.rls_table);

    Ok(Json(ApiSuccess::new(serde_json::Map::new())))
}
