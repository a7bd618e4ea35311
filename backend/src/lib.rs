//! AgroIntel decision engine backend
//!
//! HTTP surface, persistence adapters and external integrations around the
//! shared yield estimator and treatment plan model.

use std::sync::Arc;

use axum::{routing::get, Router};
use shared::ReferenceData;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod clock;
pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::config::Config;

use clock::Clock;
use external::WeatherSummaryProvider;
use services::{TreatmentService, YieldService};
use store::PlanStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reference: Arc<ReferenceData>,
    pub plans: Arc<dyn PlanStore>,
    pub weather: Option<Arc<dyn WeatherSummaryProvider>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn treatment_service(&self) -> TreatmentService {
        TreatmentService::new(
            self.plans.clone(),
            self.reference.clone(),
            self.clock.clone(),
        )
    }

    pub fn yield_service(&self) -> YieldService {
        match &self.weather {
            Some(provider) => YieldService::with_weather(
                self.reference.clone(),
                provider.clone(),
                self.config.weather.period_days,
            ),
            None => YieldService::new(self.reference.clone()),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "AgroIntel Decision Engine API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
