//! Cachelet - An in-memory key/value cache server
//!
//! Binary entry point: wires configuration, the cache engine, the TTL
//! sweeper, and the HTTP server together.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachelet::api::create_router;
use cachelet::{AppState, Config, Sweeper};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Create the cache store with configured policy and bounds
/// 4. Start the background TTL sweeper
/// 5. Create the Axum router with all endpoints and middleware
/// 6. Start the HTTP server on the configured port
/// 7. On SIGINT/SIGTERM: stop accepting requests, drain in-flight ones,
///    stop the sweeper, clear the engine, exit
#[tokio::main]
async fn main() {
    // Load configuration first; the log filter depends on it.
    let config = Config::from_env();

    // LOG_LEVEL seeds the filter; RUST_LOG overrides it entirely.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cachelet={0},tower_http={0}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cachelet cache server");
    info!(
        "Configuration loaded: policy={}, max_keys={}, max_memory_mb={}, port={}, cleanup_interval_ms={}",
        config.eviction_policy,
        config.max_keys,
        config.max_memory_mb,
        config.port,
        config.cleanup_interval_ms
    );

    // Create application state with the cache store
    let state = AppState::from_config(&config);
    info!("Cache store initialized");

    // Start the background TTL sweeper
    let mut sweeper = Sweeper::new(Arc::clone(&state.cache), config.cleanup_interval_ms);
    sweeper.start();

    // Create router with all endpoints
    let cache = Arc::clone(&state.cache);
    let app = create_router(state);

    // Bind to the configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };
    info!("Server listening on http://{}", addr);

    // Serve until a shutdown signal arrives, then drain in-flight requests.
    // Peer addresses are propagated for the per-IP rate limiter.
    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        tracing::error!("Server error: {}", err);
    }

    // Requests are drained; stop the sweeper and drop the cached data.
    sweeper.shutdown().await;
    cache.write().await.clear();
    info!("Server shutdown complete");
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
