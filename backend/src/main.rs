//! AgroIntel Decision Engine - Backend Server
//!
//! Yield estimation and disease treatment planning for field crops.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use agrointel_backend::{
    clock::SystemClock,
    config::{Config, StoreBackend},
    create_app,
    external::{HistoricalWeatherClient, WeatherSummaryProvider},
    store::{InMemoryPlanStore, JsonFilePlanStore, PgPlanStore, PlanStore},
    AppState,
};
use anyhow::Context;
use shared::ReferenceData;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "agrointel_server=debug,agrointel_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting AgroIntel Decision Engine");
    tracing::info!("Environment: {}", config.environment);

    let reference = Arc::new(load_reference(&config)?);
    tracing::info!(
        "Reference data: {} crops, {} models, {} treatments",
        reference.crops().len(),
        reference.models().len(),
        reference.treatments().len()
    );

    let plans = build_store(&config).await?;
    tracing::info!("Plan store backend: {}", plans.backend_name());

    let weather: Option<Arc<dyn WeatherSummaryProvider>> = if config.weather.enabled {
        let client = HistoricalWeatherClient::new(
            config.weather.api_endpoint.clone(),
            Duration::from_secs(config.weather.timeout_secs),
        )?;
        Some(Arc::new(client))
    } else {
        tracing::info!("Historical weather disabled; location-only predictions use estimates");
        None
    };

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        reference,
        plans,
        weather,
        clock: Arc::new(SystemClock),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_reference(config: &Config) -> anyhow::Result<ReferenceData> {
    match &config.reference.path {
        Some(path) => {
            tracing::info!("Loading reference data from {}", path);
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read reference data {}", path))?;
            Ok(ReferenceData::from_json(&json)?)
        }
        None => Ok(ReferenceData::builtin()),
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn PlanStore>> {
    tracing::info!("Configuring {} plan store", config.store.backend.name());
    let store: Arc<dyn PlanStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryPlanStore::new()),
        StoreBackend::File => {
            let store = JsonFilePlanStore::new(&config.store.file_path);
            tracing::info!("Plan document at {}", store.path().display());
            Arc::new(store)
        }
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.store.database.max_connections)
                .min_connections(config.store.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.store.database.url)
                .await?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&db_pool).await?;
            tracing::info!("Migrations completed");

            Arc::new(PgPlanStore::new(db_pool))
        }
    };

    Ok(store)
}
