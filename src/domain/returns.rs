//! Period-over-period returns and their summary statistics.

use super::error::FrontierError;
use super::prices::PriceMatrix;
use ndarray::{Array1, Array2, Axis};

/// Mean-return vector and sample covariance of the returns matrix.
#[derive(Debug, Clone)]
pub struct ReturnStats {
    pub mean_returns: Array1<f64>,
    pub covariance: Array2<f64>,
}

/// Derive the (T-1) x N simple-return matrix from a price matrix and compute
/// its mean vector and sample covariance. No outlier trimming, no recovery:
/// fewer than 2 assets or fewer than 2 price rows is rejected outright.
pub fn compute_returns(
    prices: &PriceMatrix,
) -> Result<(Array2<f64>, ReturnStats), FrontierError> {
    let (periods, n_assets) = prices.prices.dim();
    if n_assets < 2 {
        return Err(FrontierError::degenerate(format!(
            "need at least 2 assets, got {n_assets}"
        )));
    }
    if periods < 2 {
        return Err(FrontierError::degenerate(format!(
            "need at least 2 price rows, got {periods}"
        )));
    }

    let mut returns = Array2::<f64>::zeros((periods - 1, n_assets));
    for row in 1..periods {
        for col in 0..n_assets {
            let prev = prices.prices[[row - 1, col]];
            let curr = prices.prices[[row, col]];
            returns[[row - 1, col]] = (curr - prev) / prev;
        }
    }

    let mean_returns = returns
        .mean_axis(Axis(0))
        .ok_or_else(|| FrontierError::numerical("empty returns matrix"))?;

    // Sample covariance: center, then R_c^T * R_c / (rows - 1). With a single
    // return row the divisor is floored at 1, yielding the zero matrix.
    let centered = &returns - &mean_returns;
    let divisor = ((periods - 1) as f64 - 1.0).max(1.0);
    let covariance = centered.t().dot(&centered) / divisor;

    Ok((returns, ReturnStats {
        mean_returns,
        covariance,
    }))
}
