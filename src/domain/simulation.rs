//! Monte Carlo sampling of the portfolio-weight simplex.
//!
//! Trials are evaluated in fixed-size partitions, each with its own seeded
//! RNG substream, so the output is identical whether partitions run
//! sequentially or in parallel under rayon.

use super::error::FrontierError;
use super::returns::ReturnStats;
use ndarray::{s, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

pub const DEFAULT_TRIALS: usize = 25_000;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trials per RNG substream. Fixed (not derived from thread count) so the
/// partition layout, and with it every draw, depends only on the seed.
const PARTITION_TRIALS: usize = 4096;

/// Quadratic-form values in [-VARIANCE_EPSILON, 0) are treated as
/// floating-point noise and clamped to zero; anything more negative fails
/// the whole simulation.
const VARIANCE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub trial_count: usize,
    pub annualization_factor: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trial_count: DEFAULT_TRIALS,
            annualization_factor: TRADING_DAYS_PER_YEAR,
            seed: 42,
        }
    }
}

/// Column-wise storage of every trial's annualized figures plus the
/// trial-by-asset weight matrix. Retained only long enough for selection.
#[derive(Debug, Clone)]
pub struct TrialSet {
    pub annualized_returns: Vec<f64>,
    pub annualized_volatilities: Vec<f64>,
    pub sharpe_ratios: Vec<f64>,
    pub weights: Array2<f64>,
}

impl TrialSet {
    pub fn len(&self) -> usize {
        self.annualized_returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annualized_returns.is_empty()
    }
}

struct Partition {
    start: usize,
    annualized_returns: Vec<f64>,
    annualized_volatilities: Vec<f64>,
    sharpe_ratios: Vec<f64>,
    weights: Array2<f64>,
}

/// Run `trial_count` random-weight trials against the given statistics.
///
/// Each trial draws independent uniforms on [0, 1) and normalizes them by
/// their sum (the original sampling scheme, preserved exactly), then scores
/// the portfolio:
///
/// ```text
/// return     = (mean . w) * annualization_factor
/// volatility = sqrt(w' Sigma w) * sqrt(annualization_factor)
/// sharpe     = return / volatility   (0 when volatility is 0)
/// ```
pub fn simulate(
    stats: &ReturnStats,
    config: &SimulationConfig,
) -> Result<TrialSet, FrontierError> {
    let n_assets = stats.mean_returns.len();
    if n_assets < 2 {
        return Err(FrontierError::degenerate(format!(
            "need at least 2 assets, got {n_assets}"
        )));
    }
    if stats.covariance.dim() != (n_assets, n_assets) {
        let (rows, cols) = stats.covariance.dim();
        return Err(FrontierError::degenerate(format!(
            "covariance shape {rows}x{cols} does not match {n_assets} assets"
        )));
    }
    if config.trial_count == 0 {
        return Err(FrontierError::degenerate("trial count must be at least 1"));
    }

    let n_partitions = config.trial_count.div_ceil(PARTITION_TRIALS);
    let partitions: Vec<Partition> = (0..n_partitions)
        .into_par_iter()
        .map(|p| {
            let start = p * PARTITION_TRIALS;
            let end = (start + PARTITION_TRIALS).min(config.trial_count);
            simulate_partition(stats, config, p as u64, start, end - start)
        })
        .collect::<Result<_, _>>()?;

    let mut trials = TrialSet {
        annualized_returns: vec![0.0; config.trial_count],
        annualized_volatilities: vec![0.0; config.trial_count],
        sharpe_ratios: vec![0.0; config.trial_count],
        weights: Array2::zeros((config.trial_count, n_assets)),
    };
    for part in partitions {
        let end = part.start + part.annualized_returns.len();
        trials.annualized_returns[part.start..end]
            .copy_from_slice(&part.annualized_returns);
        trials.annualized_volatilities[part.start..end]
            .copy_from_slice(&part.annualized_volatilities);
        trials.sharpe_ratios[part.start..end].copy_from_slice(&part.sharpe_ratios);
        trials
            .weights
            .slice_mut(s![part.start..end, ..])
            .assign(&part.weights);
    }

    Ok(trials)
}

fn simulate_partition(
    stats: &ReturnStats,
    config: &SimulationConfig,
    index: u64,
    start: usize,
    count: usize,
) -> Result<Partition, FrontierError> {
    let n_assets = stats.mean_returns.len();
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index));

    let mut weights = Array2::<f64>::zeros((count, n_assets));
    for mut row in weights.rows_mut() {
        let mut sum = 0.0;
        for w in row.iter_mut() {
            *w = rng.gen_range(0.0..1.0);
            sum += *w;
        }
        for w in row.iter_mut() {
            *w /= sum;
        }
    }

    // Batched scoring: W.mu for returns, row-wise (W Sigma) . W for the
    // quadratic form.
    let annualized_returns: Vec<f64> = weights
        .dot(&stats.mean_returns)
        .mapv(|r| r * config.annualization_factor)
        .to_vec();
    let variances = (&weights.dot(&stats.covariance) * &weights).sum_axis(Axis(1));

    let sqrt_factor = config.annualization_factor.sqrt();
    let mut annualized_volatilities = Vec::with_capacity(count);
    let mut sharpe_ratios = Vec::with_capacity(count);
    for (i, &variance) in variances.iter().enumerate() {
        if !variance.is_finite() || variance < -VARIANCE_EPSILON {
            return Err(FrontierError::numerical(format!(
                "quadratic form produced variance {variance} at trial {}",
                start + i
            )));
        }
        let volatility = variance.max(0.0).sqrt() * sqrt_factor;
        let sharpe = if volatility != 0.0 {
            annualized_returns[i] / volatility
        } else {
            0.0
        };
        annualized_volatilities.push(volatility);
        sharpe_ratios.push(sharpe);
    }

    Ok(Partition {
        start,
        annualized_returns,
        annualized_volatilities,
        sharpe_ratios,
        weights,
    })
}
