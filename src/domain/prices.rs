//! Aligned historical price matrix.

use super::error::FrontierError;
use chrono::NaiveDate;
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};

/// T dates by N assets, chronologically ordered, gap-free.
///
/// Providers are responsible for alignment and gap filling; a matrix handed
/// to the optimizer never contains missing or non-finite values.
#[derive(Debug, Clone)]
pub struct PriceMatrix {
    pub assets: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub prices: Array2<f64>,
}

impl PriceMatrix {
    pub fn new(
        assets: Vec<String>,
        dates: Vec<NaiveDate>,
        prices: Array2<f64>,
    ) -> Result<Self, FrontierError> {
        let (rows, cols) = prices.dim();
        if rows != dates.len() || cols != assets.len() {
            return Err(FrontierError::degenerate(format!(
                "price matrix shape {}x{} does not match {} dates and {} assets",
                rows,
                cols,
                dates.len(),
                assets.len()
            )));
        }
        Ok(Self {
            assets,
            dates,
            prices,
        })
    }

    /// Build an aligned matrix from one date-keyed close series per asset.
    ///
    /// Dates are the union of all observed dates. Gaps are filled forward,
    /// then backward for any leading holes. An asset with no observations at
    /// all fails the whole request rather than being dropped silently.
    pub fn from_series(
        assets: Vec<String>,
        series: &[BTreeMap<NaiveDate, f64>],
    ) -> Result<Self, FrontierError> {
        if assets.len() != series.len() {
            return Err(FrontierError::degenerate(format!(
                "{} assets but {} series",
                assets.len(),
                series.len()
            )));
        }
        for (asset, closes) in assets.iter().zip(series) {
            if closes.is_empty() {
                return Err(FrontierError::unavailable(format!(
                    "no price observations for {asset}"
                )));
            }
        }

        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut prices = Array2::<f64>::zeros((dates.len(), assets.len()));
        for (col, closes) in series.iter().enumerate() {
            let mut last: Option<f64> = None;
            for (row, date) in dates.iter().enumerate() {
                if let Some(&price) = closes.get(date) {
                    last = Some(price);
                }
                prices[[row, col]] = last.unwrap_or(f64::NAN);
            }
            // Backward-fill leading gaps from the first real observation.
            let first = closes
                .values()
                .next()
                .copied()
                .unwrap_or(f64::NAN);
            for row in 0..dates.len() {
                if prices[[row, col]].is_nan() {
                    prices[[row, col]] = first;
                } else {
                    break;
                }
            }
        }

        Self::new(assets, dates, prices)
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn n_periods(&self) -> usize {
        self.dates.len()
    }
}
