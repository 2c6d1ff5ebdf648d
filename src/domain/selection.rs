//! Candidate extraction from a finished trial set.

use super::error::FrontierError;
use super::simulation::TrialSet;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const MAX_SHARPE_NAME: &str = "Max Sharpe Ratio";
pub const MIN_VOLATILITY_NAME: &str = "Minimum Volatility";

/// One selected portfolio. Weights keep the asset ordering of the input
/// matrix and serialize as a JSON object keyed by asset. Return and risk are
/// raw annualized fractions; percent formatting belongs to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioCandidate {
    pub name: String,
    #[serde(serialize_with = "serialize_weights")]
    pub weights: Vec<(String, f64)>,
    pub expected_return: f64,
    pub risk: f64,
}

fn serialize_weights<S: Serializer>(
    weights: &[(String, f64)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(weights.len()))?;
    for (asset, weight) in weights {
        map.serialize_entry(asset, weight)?;
    }
    map.end()
}

/// Scan all trials for the greatest Sharpe ratio and the smallest annualized
/// volatility. Ties break toward the earliest trial, which is deterministic
/// because trial generation is. Always returns [Max Sharpe, Min Volatility].
pub fn select(
    trials: &TrialSet,
    assets: &[String],
) -> Result<(PortfolioCandidate, PortfolioCandidate), FrontierError> {
    if trials.is_empty() {
        return Err(FrontierError::degenerate("no trials to select from"));
    }

    let mut max_sharpe_idx = 0;
    let mut min_vol_idx = 0;
    for i in 1..trials.len() {
        if trials.sharpe_ratios[i] > trials.sharpe_ratios[max_sharpe_idx] {
            max_sharpe_idx = i;
        }
        if trials.annualized_volatilities[i]
            < trials.annualized_volatilities[min_vol_idx]
        {
            min_vol_idx = i;
        }
    }

    Ok((
        candidate(trials, assets, max_sharpe_idx, MAX_SHARPE_NAME),
        candidate(trials, assets, min_vol_idx, MIN_VOLATILITY_NAME),
    ))
}

fn candidate(
    trials: &TrialSet,
    assets: &[String],
    index: usize,
    name: &str,
) -> PortfolioCandidate {
    let weights = assets
        .iter()
        .cloned()
        .zip(trials.weights.row(index).iter().copied())
        .collect();
    PortfolioCandidate {
        name: name.to_string(),
        weights,
        expected_return: trials.annualized_returns[index],
        risk: trials.annualized_volatilities[index],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> Vec<String> {
        vec!["AAA".to_string(), "BBB".to_string()]
    }

    fn trial_set(
        returns: Vec<f64>,
        volatilities: Vec<f64>,
        sharpes: Vec<f64>,
    ) -> TrialSet {
        let n = returns.len();
        let mut weights = ndarray::Array2::zeros((n, 2));
        for i in 0..n {
            weights[[i, 0]] = 0.25 + i as f64 * 0.01;
            weights[[i, 1]] = 0.75 - i as f64 * 0.01;
        }
        TrialSet {
            annualized_returns: returns,
            annualized_volatilities: volatilities,
            sharpe_ratios: sharpes,
            weights,
        }
    }

    #[test]
    fn picks_max_sharpe_and_min_volatility() {
        let trials = trial_set(
            vec![0.10, 0.20, 0.15],
            vec![0.30, 0.25, 0.10],
            vec![0.33, 0.80, 1.50],
        );
        let (max_sharpe, min_vol) = select(&trials, &assets()).unwrap();

        assert_eq!(max_sharpe.name, MAX_SHARPE_NAME);
        assert!((max_sharpe.expected_return - 0.15).abs() < 1e-12);
        assert!((max_sharpe.risk - 0.10).abs() < 1e-12);

        assert_eq!(min_vol.name, MIN_VOLATILITY_NAME);
        assert!((min_vol.risk - 0.10).abs() < 1e-12);
    }

    #[test]
    fn ties_break_toward_first_occurrence() {
        let trials = trial_set(
            vec![0.10, 0.10, 0.10],
            vec![0.20, 0.20, 0.20],
            vec![0.50, 0.50, 0.50],
        );
        let (max_sharpe, min_vol) = select(&trials, &assets()).unwrap();

        // Trial 0's weights are (0.25, 0.75).
        assert_eq!(max_sharpe.weights[0].1, 0.25);
        assert_eq!(min_vol.weights[0].1, 0.25);
    }

    #[test]
    fn weights_preserve_asset_order() {
        let trials = trial_set(vec![0.1], vec![0.2], vec![0.5]);
        let (max_sharpe, _) = select(&trials, &assets()).unwrap();

        assert_eq!(max_sharpe.weights[0].0, "AAA");
        assert_eq!(max_sharpe.weights[1].0, "BBB");
    }

    #[test]
    fn empty_trial_set_is_rejected() {
        let trials = TrialSet {
            annualized_returns: vec![],
            annualized_volatilities: vec![],
            sharpe_ratios: vec![],
            weights: ndarray::Array2::zeros((0, 2)),
        };
        let err = select(&trials, &assets()).unwrap_err();
        assert!(matches!(err, FrontierError::DegenerateInput { .. }));
    }

    #[test]
    fn weights_serialize_as_ordered_object() {
        let trials = trial_set(vec![0.1], vec![0.2], vec![0.5]);
        let (max_sharpe, _) = select(&trials, &assets()).unwrap();

        let json = serde_json::to_string(&max_sharpe).unwrap();
        let aaa = json.find("\"AAA\"").unwrap();
        let bbb = json.find("\"BBB\"").unwrap();
        assert!(aaa < bbb);
        assert!(json.contains("\"name\":\"Max Sharpe Ratio\""));
    }
}
