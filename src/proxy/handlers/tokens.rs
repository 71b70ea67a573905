// Token issuance / invalidation handlers
use axum::{
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    response::Json,
};
use bytes::Bytes;
use serde::Deserialize;

use super::{load_member, parse_json_body, require_member_id};
use crate::error::{AppError, AppResult};
use crate::models::{ApiSuccess, MessageOnly, TokenIssued};
use crate::modules::db;
use crate::proxy::middleware::require_admin;
use crate::proxy::server::AppState;

pub const DEFAULT_DAYS_VALID: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct GenerateTokenRequest {
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default, alias = "daysValid")]
    pub days_valid: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    #[serde(default)]
    pub member_id: Option<String>,
}

/// POST /api/auth/generate-token
pub async fn handle_generate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ApiSuccess<TokenIssued>>> {
    let admin = require_admin(&state, &headers).await?;
    let body = body?;

    let request: GenerateTokenRequest = parse_json_body(&body)?;
    let member_id = require_member_id(request.member_id)?;
    let days_valid = request.days_valid.unwrap_or(DEFAULT_DAYS_VALID);
    if days_valid == 0 {
        return Err(AppError::BadRequest(
            "days_valid must be at least 1".to_string(),
        ));
    }

    let member = load_member(&state, &member_id).await?;
    let token = db::generate_member_token(state.rpc.as_ref(), &member.id, days_valid).await?;

    tracing::info!(
        admin = %admin.id,
        member = %member.id,
        days_valid,
        "Issued member token"
    );

    Ok(Json(ApiSuccess::new(TokenIssued {
        token,
        member: member.identity(),
        expires_in_days: days_valid,
    })))
}

/// POST /api/auth/invalidate-tokens
pub async fn handle_invalidate_tokens(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ApiSuccess<MessageOnly>>> {
    let admin = require_admin(&state, &headers).await?;
    let body = body?;

    let request: MemberRequest = parse_json_body(&body)?;
    let member_id = require_member_id(request.member_id)?;

    let member = load_member(&state, &member_id).await?;
    db::invalidate_member_tokens(state.rpc.as_ref(), &member.id).await?;

    tracing::info!(admin = %admin.id, member = %member.id, "Invalidated member tokens");

    Ok(Json(ApiSuccess::new(MessageOnly {
        message: "All tokens invalidated for member".to_string(),
    })))
}
