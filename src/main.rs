use commodity_sentiment::application::router::build_router;
use commodity_sentiment::application::services::market_service::MarketService;
use commodity_sentiment::config::{AppConfig, StorageBackend};
use commodity_sentiment::domain::repositories::MarketStore;
use commodity_sentiment::persistence::{init_database, MemoryMarketStore, SqliteMarketStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn open_store(config: &AppConfig) -> Result<Arc<dyn MarketStore>, Box<dyn std::error::Error>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            let mut rng = match config.demo_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let store = if config.demo_history_days > 0 {
                MemoryMarketStore::with_demo_history(config.demo_history_days, &mut rng)
            } else {
                MemoryMarketStore::new()
            };
            Ok(Arc::new(store))
        }
        StorageBackend::Sqlite => {
            let pool = init_database(&config.database).await?;
            Ok(Arc::new(SqliteMarketStore::new(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "commodity_sentiment=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    info!("Commodity sentiment server starting...");
    info!(
        "Storage backend: {:?}, body limit: {} bytes",
        config.storage_backend, config.max_body_bytes
    );

    let store = open_store(&config).await?;
    let service = Arc::new(MarketService::new(store));
    let app = build_router(service, &config);

    info!("Listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    let server = axum::serve(listener, app);

    // Set up graceful shutdown
    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    info!("Server started successfully. Press Ctrl+C to stop.");
    server.with_graceful_shutdown(shutdown_signal).await?;

    info!("Shutdown complete");
    Ok(())
}
