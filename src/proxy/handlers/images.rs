// Image proxy handler
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use super::raw_path_tail;
use crate::proxy::server::AppState;

pub const IMAGES_PREFIX: &str = "/api/images/";

pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Relay `/api/images/{path}` from `{api_url}/images/{path}`
///
/// Backend non-2xx is always reported as 404; only transport failures are 500.
pub async fn handle_image(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = raw_path_tail(&uri, IMAGES_PREFIX);
    let target = format!("images/{}", path);

    let upstream = match state
        .upstream
        .forward(Method::GET, &target, uri.query(), &headers, Bytes::new())
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Image proxy error for {}: {}", path, e);
            return plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch image");
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        tracing::warn!("Backend returned {} for image {}", status, path);
        return plain_text(StatusCode::NOT_FOUND, "Image not found");
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, IMAGE_CACHE_CONTROL)
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build image response: {}", e);
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch image")
        })
}

fn plain_text(status: StatusCode, message: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}
