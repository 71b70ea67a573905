// Authorization gate
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, AppResult};
use crate::models::SessionUser;
use crate::proxy::server::AppState;

/// Cookie carrying the Supabase access token for browser sessions
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Proxy routes: reject requests without an Authorization header before anything is forwarded
pub async fn require_authorization(request: Request, next: Next) -> Response {
    tracing::info!("Request: {} {}", request.method(), request.uri());

    let present = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);

    if present {
        next.run(request).await
    } else {
        AppError::Unauthorized.into_response()
    }
}

/// Access token from `Authorization: Bearer` or, failing that, the session cookie
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Credential routes: resolve the session and require the admin role
///
/// No token or unknown session → 401; role check false or failing → 403
pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> AppResult<SessionUser> {
    let token = extract_access_token(headers).ok_or(AppError::Unauthorized)?;

    let user = match state.identity.validate_session(&token).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AppError::Unauthorized),
        Err(e) => {
            tracing::error!("Session validation failed: {}", e);
            return Err(AppError::Unauthorized);
        }
    };

    match state.identity.is_admin(&token, &user).await {
        Ok(true) => Ok(user),
        Ok(false) => {
            tracing::warn!("User {} is not an admin", user.id);
            Err(AppError::Forbidden)
        }
        Err(e) => {
            tracing::error!("Admin role check failed for {}: {}", user.id, e);
            Err(AppError::Forbidden)
        }
    }
}
