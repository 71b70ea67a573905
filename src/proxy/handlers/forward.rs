// Generic reverse proxy handler
use axum::{
    body::Body,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;

use super::raw_path_tail;
use crate::error::AppError;
use crate::models::ApiError;
use crate::proxy::server::AppState;

pub const PROXY_PREFIX: &str = "/api/proxy/";

const BACKEND_UNREACHABLE: &str = "Failed to reach backend service";

/// Forward `/api/proxy/{path}` to `{api_url}/{path}` with the same method, query and body
///
/// The path tail is taken from the raw URI so percent-encoding reaches the backend untouched.
/// Status and body are relayed as is; only Content-Type and Cache-Control are set here.
pub async fn handle_forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(b) => b,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };
    let path = raw_path_tail(&uri, PROXY_PREFIX);

    let upstream = match state
        .upstream
        .forward(method.clone(), path, uri.query(), &headers, body)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Proxy {} /{} failed: {}", method, path, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(BACKEND_UNREACHABLE)),
            )
                .into_response();
        }
    };

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();

    let bytes = match upstream.bytes().await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("Failed to read backend response for /{}: {}", path, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(BACKEND_UNREACHABLE)),
            )
                .into_response();
        }
    };

    if !status.is_success() {
        tracing::warn!("Backend returned {} for {} /{}", status, method, path);
    }

    // Empty bodies (204, 304) carry no type; anything else defaults to JSON
    let content_type = match content_type {
        Some(value) => Some(value),
        None if bytes.is_empty() => None,
        None => Some(HeaderValue::from_static("application/json")),
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CACHE_CONTROL, "no-store");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder.body(Body::from(bytes)).unwrap_or_else(|e| {
        tracing::error!("Failed to build proxy response: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
