//! Cache Gateway server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_gateway::{
    create_router, spawn_expiry_sweep, AppState, Config, KeyValueClient, MemoryStore,
    RedisClient, StoreBackend,
};

/// Main entry point for the cache gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to the configured store backend
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cache Gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, port={}, memo_capacity={}, redis={}:{}",
        config.store_backend,
        config.server_port,
        config.memo_capacity,
        config.redis_host,
        config.redis_port
    );

    let (store, sweep) = open_store(&config).await?;
    let state = AppState::new(store, &config);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Opens the configured backend. The in-process store also gets an expiry sweep.
async fn open_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn KeyValueClient>, Option<JoinHandle<()>>)> {
    match config.store_backend {
        StoreBackend::Redis => {
            let client = RedisClient::connect(&config.redis_url(), config.redis_timeout())
                .await
                .with_context(|| {
                    format!(
                        "failed to connect to Redis at {}:{}",
                        config.redis_host, config.redis_port
                    )
                })?;
            info!("Connected to Redis");
            Ok((Arc::new(client), None))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            let sweep = spawn_expiry_sweep(store.clone(), config.cleanup_interval);
            info!("Using in-process store, expiry sweep started");
            Ok((Arc::new(store), Some(sweep)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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

    if let Some(handle) = sweep {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}
