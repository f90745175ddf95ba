//! eShop API - REST backend for a conventional online shop

use anyhow::Result;
use eshop_api::config::Config;
use eshop_api::events::EventBus;
use eshop_api::{routes, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(url, "connected to NATS");
                Some(client)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "NATS unavailable, events disabled");
                None
            }
        },
        None => None,
    };

    let port = config.port;
    let state = AppState::new(config, EventBus::new(nats));
    let app = routes::router(state);

    tracing::info!("🚀 eShop API listening on 0.0.0.0:{}", port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?,
        app,
    )
    .await?;
    Ok(())
}
