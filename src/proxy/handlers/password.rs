// Default password assignment
use axum::{
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    response::Json,
};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};

use super::tokens::MemberRequest;
use super::{load_member, parse_json_body, require_member_id};
use crate::error::{AppError, AppResult};
use crate::models::{ApiSuccess, PasswordAssigned, PasswordUpdate};
use crate::modules::password::{generate_password, hash_password, DEFAULT_PASSWORD_LENGTH};
use crate::proxy::middleware::require_admin;
use crate::proxy::server::AppState;

/// POST /api/auth/set-default-password
///
/// The plaintext is returned once so an admin can hand it over; the member must reset it on
/// first login.
// TODO: deliver the password by email and drop it from the response body.
pub async fn handle_set_default_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ApiSuccess<PasswordAssigned>>> {
    let admin = require_admin(&state, &headers).await?;
    let body = body?;

    let request: MemberRequest = parse_json_body(&body)?;
    let member_id = require_member_id(request.member_id)?;
    let member = load_member(&state, &member_id).await?;

    let password = generate_password(DEFAULT_PASSWORD_LENGTH);
    let update = PasswordUpdate {
        password_hash: hash_password(&password)?,
        password_reset_required: true,
        password_last_changed: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    if !state.members.update_password(&member.id, &update).await? {
        tracing::warn!(member = %member.id, "Member disappeared before password update");
        return Err(AppError::NotFound("Member not found".to_string()));
    }

    tracing::info!(admin = %admin.id, member = %member.id, "Assigned default password");

    Ok(Json(ApiSuccess::new(PasswordAssigned {
        password,
        member: member.identity(),
        message: "Default password set. The member must change it at next login.".to_string(),
    })))
}
