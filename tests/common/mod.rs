#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use church_portal_lib::models::AppConfig;
use church_portal_lib::{build_router, AppState};
use httpmock::MockServer;
use tower::ServiceExt;

pub const ANON_KEY: &str = "anon-key";
pub const SERVICE_KEY: &str = "service-key";
pub const SETUP_KEY: &str = "integration-setup-key";

/// Gateway router wired to mock backend API and mock Supabase
pub fn gateway(backend: &MockServer, supabase: &MockServer) -> Router {
    let mut config = AppConfig::default();
    config.proxy.api_url = backend.base_url();
    config.proxy.request_timeout = 5;
    config.supabase.url = supabase.base_url();
    config.supabase.anon_key = ANON_KEY.to_string();
    config.supabase.service_role_key = Some(SERVICE_KEY.to_string());
    config.setup.secret = Some(SETUP_KEY.to_string());

    build_router(AppState::from_config(&config), 1024 * 1024)
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
