use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod clients;
mod config;
mod domain;
mod http;
mod metrics;
#[cfg(test)]
mod mock;
mod models;
mod store;
mod utils;

use clients::{lazy_channel, GrpcAccountClient, GrpcCatalogClient};
use config::AppConfig;
use domain::order::{OrderCommandHandler, OrderQueryHandler};
use store::{create_pool, PostgresOrderStore};
use utils::CircuitBreakerConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set ORDER_* directly.
    dotenvy::dotenv().ok();

    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_service=debug")),
        )
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        port = config.port,
        account_service = %config.account_service_url,
        catalog_service = %config.catalog_service_url,
        "Starting order service"
    );

    // === 1. Order store ===
    let pool = create_pool(
        &config.database_url,
        config.max_connections,
        config.connect_timeout(),
    )
    .await?;
    let store = Arc::new(PostgresOrderStore::new(pool));
    store.ensure_schema().await?;

    // === 2. Collaborators (connect lazily, so startup does not wait on them) ===
    let accounts = Arc::new(GrpcAccountClient::new(
        lazy_channel(
            &config.account_service_url,
            config.collaborator_timeout(),
            config.connect_timeout(),
        )?,
        CircuitBreakerConfig::default(),
    ));
    let catalog = Arc::new(GrpcCatalogClient::new(
        lazy_channel(
            &config.catalog_service_url,
            config.collaborator_timeout(),
            config.connect_timeout(),
        )?,
        CircuitBreakerConfig::default(),
    ));

    // === 3. Metrics and handlers ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    let commands = OrderCommandHandler::new(accounts, catalog.clone(), store.clone(), metrics.clone());
    let queries = OrderQueryHandler::new(store, catalog, config.store_retry(), metrics.clone());

    // === 4. Serve ===
    http::serve(
        http::AppState {
            commands: Arc::new(commands),
            queries: Arc::new(queries),
            metrics,
        },
        config.port,
    )
    .await?;

    tracing::info!("Order service stopped");
    Ok(())
}
