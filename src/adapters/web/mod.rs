//! Web server adapter (feature `web`).
//!
//! Exposes the optimization pipeline as a JSON API with permissive CORS so
//! browser frontends can call it directly.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::domain::simulation::{DEFAULT_TRIALS, TRADING_DAYS_PER_YEAR};
use crate::ports::price_port::PricePort;

pub struct AppState {
    pub price_port: Arc<dyn PricePort + Send + Sync>,
    pub default_trials: usize,
    pub annualization_factor: f64,
    pub timeout: Duration,
}

impl AppState {
    pub fn new(price_port: Arc<dyn PricePort + Send + Sync>) -> Self {
        Self {
            price_port,
            default_trials: DEFAULT_TRIALS,
            annualization_factor: TRADING_DAYS_PER_YEAR,
            timeout: Duration::from_secs(30),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/optimize", post(handlers::optimize))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
