use crate::models::{AppConfig, SetupConfig};
use crate::modules::{IdentityProvider, MemberStore, RemoteProcedures, SupabaseClient};
use crate::proxy::upstream::client::UpstreamClient;
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json, Response},
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub identity: Arc<dyn IdentityProvider>,
    pub members: Arc<dyn MemberStore>,
    pub rpc: Arc<dyn RemoteProcedures>,
    pub setup: Arc<SetupConfig>,
}

impl AppState {
    /// Wire the production clients from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let http_client = crate::utils::http::create_client_with_proxy(
            config.proxy.request_timeout,
            Some(config.proxy.upstream_proxy.clone()),
        );
        let supabase = Arc::new(SupabaseClient::new(
            http_client.clone(),
            config.supabase.clone(),
        ));

        Self {
            upstream: Arc::new(UpstreamClient::new(
                http_client,
                config.proxy.backend_base_url(),
            )),
            identity: supabase.clone(),
            members: supabase.clone(),
            rpc: supabase,
            setup: Arc::new(config.setup.clone()),
        }
    }
}

/// Build the gateway router
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    use crate::proxy::handlers;
    use crate::proxy::middleware::{cors_layer, require_authorization};

    // Proxy routes need an Authorization header before anything is forwarded
    let proxied = Router::new()
        .route("/api/proxy/*path", any(handlers::forward::handle_forward))
        .route_layer(axum::middleware::from_fn(require_authorization));

    Router::new()
        // Image proxy (auth optional)
        .route("/api/images/*path", get(handlers::images::handle_image))
        // Credential routes (admin session)
        .route(
            "/api/auth/generate-token",
            post(handlers::tokens::handle_generate_token),
        )
        .route(
            "/api/auth/invalidate-tokens",
            post(handlers::tokens::handle_invalidate_tokens),
        )
        .route(
            "/api/auth/set-default-password",
            post(handlers::password::handle_set_default_password),
        )
        // Setup-time only
        .route(
            "/api/setup/disable-rls",
            get(handlers::setup::handle_disable_rls),
        )
        .route("/healthz", get(health_check_handler))
        .merge(proxied)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(
        host: &str,
        port: u16,
        state: AppState,
        max_body_bytes: usize,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let backend = state.upstream.base_url().to_string();
        let app = build_router(state, max_body_bytes);

        // Bind address
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;

        tracing::info!("Gateway started at http://{} (backend: {})", addr, backend);

        // Create shutdown channel
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
        };

        // Start server in new task
        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Gateway stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}
