mod cli;
mod commands;

use bazaar::{FollowCache, FollowService, ViewerSession};
use bazaar_client::{ApiClient, HttpFollowApi};
use clap::Parser;
use cli::Cli;
use commands::App;
use shared::config::ClientConfig;
use std::process::ExitCode;
use std::sync::Arc;
use storage_engine::follow_store_from_config;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    // Parse after .env so BAZAAR_EMAIL / BAZAAR_PASSWORD can come from it
    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    info!("Using Bazaar API at {}", config.api_base_url);

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Invalid client configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (event_tx, mut event_rx) = broadcast::channel(64);
    let store = Arc::new(follow_store_from_config(&config));
    let cache = Arc::new(
        FollowCache::new(Arc::new(HttpFollowApi::new(client.clone())), store)
            .with_batch_limit(config.follow_batch_limit)
            .with_event_broadcaster(event_tx),
    );

    let notices = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => info!("{}", event.notice()),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Dropped {skipped} follow notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let app = App {
        client,
        follows: FollowService::new(Arc::clone(&cache)),
        session: ViewerSession::new(Arc::clone(&cache)),
    };

    let outcome = app.run(cli).await;

    // Close the channel so the notice task drains and exits
    drop(app);
    drop(cache);
    let _ = notices.await;

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
