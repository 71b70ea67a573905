use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::models::LogConfig;

fn ensure_log_dir(log_dir: &Path) -> Result<(), String> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;
    }
    Ok(())
}

/// Initialize logger system
pub fn init_logger(config: &LogConfig) {
    // Capture log macro logs
    let _ = tracing_log::LogTracer::init();

    // 1. Console output layer (stderr)
    let console_layer = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    // 2. Optional file layer, daily rolling, no ANSI
    let mut file_enabled = false;
    let file_layer = match config.dir.as_deref() {
        Some(dir) => match ensure_log_dir(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, "gateway.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // Keep the writer alive until exit; nothing flushes it manually
                std::mem::forget(guard);
                file_enabled = true;
                Some(
                    fmt::Layer::new()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_level(true)
                        .boxed(),
                )
            }
            Err(e) => {
                eprintln!("{}", e);
                None
            }
        },
        None => None,
    };

    // 3. Filter: RUST_LOG wins, otherwise the configured level
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // 4. try_init so a second call (tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    info!(
        "Logger initialized (console{})",
        if file_enabled { " + file" } else { "" }
    );
}
