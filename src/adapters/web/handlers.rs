//! HTTP request handlers for the web adapter.

use axum::{extract::State, Json};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

use crate::domain::returns::compute_returns;
use crate::domain::selection::{select, PortfolioCandidate};
use crate::domain::simulation::{simulate, SimulationConfig};

use super::{ApiError, AppState};

const DEFAULT_START_DATE: &str = "2020-01-01";

#[derive(Debug, serde::Deserialize)]
pub struct OptimizeRequest {
    pub tickers: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, serde::Serialize)]
pub struct OptimizeResponse {
    pub portfolios: [PortfolioCandidate; 2],
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn optimize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let tickers: Vec<String> = request
        .tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tickers.len() < 2 {
        return Err(ApiError::bad_request(
            "'tickers' must list at least two symbols",
        ));
    }

    let start = parse_date(request.start_date.as_deref().unwrap_or(DEFAULT_START_DATE))
        .map_err(|_| ApiError::bad_request("invalid start_date (expected YYYY-MM-DD)"))?;
    let end = match request.end_date.as_deref() {
        Some(raw) => parse_date(raw)
            .map_err(|_| ApiError::bad_request("invalid end_date (expected YYYY-MM-DD)"))?,
        None => Local::now().date_naive(),
    };
    if end < start {
        return Err(ApiError::bad_request("end_date precedes start_date"));
    }

    let trial_count = request.trials.unwrap_or(state.default_trials);
    if trial_count == 0 {
        return Err(ApiError::bad_request("trials must be at least 1"));
    }

    let config = SimulationConfig {
        trial_count,
        annualization_factor: state.annualization_factor,
        seed: request.seed.unwrap_or_else(rand::random),
    };

    // Fetch + simulate are CPU/IO-bound and synchronous; run them off the
    // async executor, bounded by the configured deadline. On timeout the
    // caller gets a failure, never a partial candidate set; the orphaned
    // task runs to completion on the blocking pool and its result is
    // dropped.
    let port = state.price_port.clone();
    let task = tokio::task::spawn_blocking(move || {
        let prices = port.fetch_prices(&tickers, start, end)?;
        let (_, stats) = compute_returns(&prices)?;
        let trials = simulate(&stats, &config)?;
        select(&trials, &prices.assets)
    });

    let (max_sharpe, min_volatility) = tokio::time::timeout(state.timeout, task)
        .await
        .map_err(|_| ApiError::timeout())?
        .map_err(|e| ApiError::internal(format!("optimization task failed: {e}")))??;

    Ok(Json(OptimizeResponse {
        portfolios: [max_sharpe, min_volatility],
    }))
}

fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
}
