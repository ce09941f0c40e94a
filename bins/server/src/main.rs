//! tweetstore server
//!
//! Stores the account's mentions in every configured blob store and serves
//! them back, with a cron and a task queue driving the periodic store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tweetstore_api::{AppState, create_router};
use tweetstore_core::storage::ProviderRegistry;
use tweetstore_core::tweets::TweetService;
use tweetstore_platform::{Cron, HttpTaskQueue, InternalClient, PlatformServices, TaskQueue};
use tweetstore_shared::{AppConfig, constants::TWITTER_QUEUE};
use tweetstore_twitter::TwitterClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tweetstore=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Storage contexts
    let allowed = config.store.allowed_blobstores();
    let registry = Arc::new(
        ProviderRegistry::from_settings(&config.providers, allowed.as_deref())
            .context("Failed to create storage contexts")?,
    );
    info!(
        providers = ?registry.names().collect::<Vec<_>>(),
        container = %config.store.container,
        "Storage contexts ready"
    );

    let twitter = TwitterClient::new(&config.twitter).context("Invalid twitter settings")?;

    // Platform services
    let base_url = config.server.base_url();
    let internal = InternalClient::new(&base_url, config.server.internal_token.clone())?;
    let queue: Arc<dyn TaskQueue> = Arc::new(HttpTaskQueue::start(TWITTER_QUEUE, internal.clone()));
    let services = PlatformServices::new(base_url.clone()).with_queue(Arc::clone(&queue));
    info!(base_url = %services.base_url(), queue = TWITTER_QUEUE, "Platform services ready");

    // Create application state
    let state = AppState {
        tweets: Arc::new(TweetService::new(
            Arc::clone(&registry),
            config.store.container.clone(),
        )),
        source: Arc::new(twitter),
        queue,
        internal_token: config.server.internal_token.as_deref().map(Arc::from),
    };

    let app = create_router(state);

    let cron = Cron::start(internal, Duration::from_secs(config.schedule.interval_secs));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cron))
        .await?;

    registry.close();
    services.destroy().await;
    info!("Server stopped");

    Ok(())
}

/// Waits for ctrl-c, then stops the cron before the server drains.
async fn shutdown_signal(cron: Option<Cron>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown requested");
    if let Some(cron) = cron {
        cron.stop().await;
    }
}
