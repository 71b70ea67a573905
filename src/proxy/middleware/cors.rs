// CORS layer
use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS: the portal frontend may be served from a different origin than the gateway
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
