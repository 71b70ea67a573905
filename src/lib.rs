pub mod error;
pub mod models;
pub mod modules;
pub mod proxy; // Gateway HTTP surface
mod utils;

use modules::logger;
use tracing::{error, info};

pub use error::{AppError, AppResult};
pub use proxy::{build_router, AppState, AxumServer};

/// Load configuration, start the gateway and run until Ctrl-C
pub async fn run() -> AppResult<()> {
    let config = modules::load_app_config()?;
    logger::init_logger(&config.log);

    if config.setup.secret.is_none() {
        info!("SETUP_SECRET not set, /api/setup/disable-rls is disabled");
    }

    let state = AppState::from_config(&config);
    let (server, handle) = AxumServer::start(
        config.proxy.get_bind_address(),
        config.proxy.port,
        state,
        config.proxy.max_body_bytes,
    )
    .await
    .map_err(AppError::Unknown)?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");

    server.stop();
    if let Err(e) = handle.await {
        error!("Gateway task ended abnormally: {}", e);
    }
    Ok(())
}
