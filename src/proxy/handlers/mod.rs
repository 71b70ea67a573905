// API endpoint handlers

pub mod forward;
pub mod images;
pub mod password;
pub mod setup;
pub mod tokens;

use axum::http::Uri;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};
use crate::models::Member;
use crate::proxy::server::AppState;

/// Wildcard remainder of the request path after `prefix`, still percent-encoded
///
/// axum's `Path` extractor decodes, which would turn `%2F` into a separator and `%3F` into a
/// query delimiter on the backend URL.
pub(crate) fn raw_path_tail<'a>(uri: &'a Uri, prefix: &str) -> &'a str {
    uri.path().strip_prefix(prefix).unwrap_or_default()
}

/// Parse a JSON body, mapping any failure to 400 with the envelope
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Request body is required".to_string()));
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Trimmed, non-empty member id or 400
pub(crate) fn require_member_id(member_id: Option<String>) -> AppResult<String> {
    member_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Member ID is required".to_string()))
}

/// Look up a member or 404
pub(crate) async fn load_member(state: &AppState, member_id: &str) -> AppResult<Member> {
    state
        .members
        .find_member(member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
}
