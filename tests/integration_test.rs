//! Full-pipeline integration tests with a mock price provider.
//!
//! Covers the end-to-end fixture (two assets over five periods), candidate
//! dominance over all trials, determinism across repeated runs, the scaling
//! property of larger trial counts, and degenerate-input rejection.

mod common;

use approx::assert_relative_eq;
use common::*;
use frontier::adapters::csv_adapter::CsvAdapter;
use frontier::cli::run_pipeline;
use frontier::domain::error::FrontierError;
use frontier::domain::returns::compute_returns;
use frontier::domain::selection::{select, MAX_SHARPE_NAME, MIN_VOLATILITY_NAME};
use frontier::domain::simulation::{simulate, SimulationConfig, TRADING_DAYS_PER_YEAR};
use frontier::ports::price_port::PricePort;

fn fixture_config(trials: usize, seed: u64) -> SimulationConfig {
    SimulationConfig {
        trial_count: trials,
        annualization_factor: TRADING_DAYS_PER_YEAR,
        seed,
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn fixture_produces_two_candidates_in_order() {
        let port = fixture_port();
        let (max_sharpe, min_vol) = run_pipeline(
            &port,
            &fixture_symbols(),
            date(2024, 1, 1),
            date(2024, 1, 5),
            &fixture_config(1000, 42),
        )
        .unwrap();

        assert_eq!(max_sharpe.name, MAX_SHARPE_NAME);
        assert_eq!(min_vol.name, MIN_VOLATILITY_NAME);

        for candidate in [&max_sharpe, &min_vol] {
            assert_eq!(candidate.weights.len(), 2);
            let sum: f64 = candidate.weights.iter().map(|(_, w)| w).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
            assert!(candidate.weights.iter().all(|(_, w)| *w >= 0.0));
        }

        // Both fixture assets trend upward, so the min-vol return is
        // positive and the max-Sharpe trial must dominate on Sharpe.
        assert!(min_vol.expected_return >= 0.0);
        let max_sharpe_ratio = max_sharpe.expected_return / max_sharpe.risk;
        let min_vol_ratio = min_vol.expected_return / min_vol.risk;
        assert!(max_sharpe_ratio >= min_vol_ratio);
    }

    #[test]
    fn weight_mapping_preserves_request_order() {
        let port = fixture_port();
        let (max_sharpe, _) = run_pipeline(
            &port,
            &fixture_symbols(),
            date(2024, 1, 1),
            date(2024, 1, 5),
            &fixture_config(200, 42),
        )
        .unwrap();

        assert_eq!(max_sharpe.weights[0].0, "AAA");
        assert_eq!(max_sharpe.weights[1].0, "BBB");
    }

    #[test]
    fn csv_provider_feeds_the_same_pipeline() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(
            &path,
            "date,AAA,BBB\n\
             2024-01-01,100.0,50.0\n\
             2024-01-02,101.0,50.5\n\
             2024-01-03,102.0,51.0\n\
             2024-01-04,101.0,50.8\n\
             2024-01-05,103.0,51.5\n",
        )
        .unwrap();

        let adapter = CsvAdapter::new(path);
        let (from_csv, _) = run_pipeline(
            &adapter,
            &fixture_symbols(),
            date(2024, 1, 1),
            date(2024, 1, 5),
            &fixture_config(1000, 42),
        )
        .unwrap();

        let port = fixture_port();
        let (from_mock, _) = run_pipeline(
            &port,
            &fixture_symbols(),
            date(2024, 1, 1),
            date(2024, 1, 5),
            &fixture_config(1000, 42),
        )
        .unwrap();

        assert_eq!(from_csv.expected_return, from_mock.expected_return);
        assert_eq!(from_csv.risk, from_mock.risk);
    }
}

mod dominance {
    use super::*;

    #[test]
    fn selected_candidates_dominate_every_trial() {
        let port = fixture_port();
        let prices = port
            .fetch_prices(&fixture_symbols(), date(2024, 1, 1), date(2024, 1, 5))
            .unwrap();
        let (_, stats) = compute_returns(&prices).unwrap();
        let trials = simulate(&stats, &fixture_config(1000, 42)).unwrap();
        let (max_sharpe, min_vol) = select(&trials, &prices.assets).unwrap();

        let best_sharpe = max_sharpe.expected_return / max_sharpe.risk;
        for i in 0..trials.len() {
            assert!(best_sharpe >= trials.sharpe_ratios[i]);
            assert!(min_vol.risk <= trials.annualized_volatilities[i]);
        }
    }
}

mod determinism {
    use super::*;

    #[test]
    fn identical_inputs_yield_identical_json() {
        let run = || {
            let port = fixture_port();
            let (a, b) = run_pipeline(
                &port,
                &fixture_symbols(),
                date(2024, 1, 1),
                date(2024, 1, 5),
                &fixture_config(5000, 42),
            )
            .unwrap();
            serde_json::to_string(&serde_json::json!({ "portfolios": [a, b] })).unwrap()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn single_threaded_pool_matches_parallel_pool() {
        let port = fixture_port();
        let prices = port
            .fetch_prices(&fixture_symbols(), date(2024, 1, 1), date(2024, 1, 5))
            .unwrap();
        let (_, stats) = compute_returns(&prices).unwrap();
        let config = fixture_config(10_000, 42);

        let parallel = simulate(&stats, &config).unwrap();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let sequential = pool.install(|| simulate(&stats, &config)).unwrap();

        assert_eq!(sequential.annualized_returns, parallel.annualized_returns);
        assert_eq!(
            sequential.annualized_volatilities,
            parallel.annualized_volatilities
        );
        assert_eq!(sequential.sharpe_ratios, parallel.sharpe_ratios);
        assert_eq!(sequential.weights, parallel.weights);
    }

    #[test]
    fn scaling_trials_never_worsens_the_extremes() {
        let port = fixture_port();
        let prices = port
            .fetch_prices(&fixture_symbols(), date(2024, 1, 1), date(2024, 1, 5))
            .unwrap();
        let (_, stats) = compute_returns(&prices).unwrap();

        let small = simulate(&stats, &fixture_config(1000, 42)).unwrap();
        let large = simulate(&stats, &fixture_config(100_000, 42)).unwrap();

        let best = |sharpes: &[f64]| sharpes.iter().cloned().fold(f64::MIN, f64::max);
        let least = |vols: &[f64]| vols.iter().cloned().fold(f64::MAX, f64::min);

        assert!(best(&large.sharpe_ratios) >= best(&small.sharpe_ratios));
        assert!(least(&large.annualized_volatilities) <= least(&small.annualized_volatilities));
    }
}

mod degenerate_inputs {
    use super::*;

    #[test]
    fn single_asset_is_rejected() {
        let port = MockPricePort::new().with_closes(
            "AAA",
            "2024-01-01",
            &[100.0, 101.0, 102.0],
        );
        let err = run_pipeline(
            &port,
            &["AAA".to_string()],
            date(2024, 1, 1),
            date(2024, 1, 3),
            &fixture_config(100, 42),
        )
        .unwrap_err();
        assert!(matches!(err, FrontierError::DegenerateInput { .. }));
    }

    #[test]
    fn single_time_step_is_rejected() {
        let port = MockPricePort::new()
            .with_closes("AAA", "2024-01-01", &[100.0])
            .with_closes("BBB", "2024-01-01", &[50.0]);
        let err = run_pipeline(
            &port,
            &fixture_symbols(),
            date(2024, 1, 1),
            date(2024, 1, 1),
            &fixture_config(100, 42),
        )
        .unwrap_err();
        assert!(matches!(err, FrontierError::DegenerateInput { .. }));
    }

    #[test]
    fn unknown_symbol_is_unavailable() {
        let port = fixture_port();
        let err = run_pipeline(
            &port,
            &["AAA".to_string(), "ZZZ".to_string()],
            date(2024, 1, 1),
            date(2024, 1, 5),
            &fixture_config(100, 42),
        )
        .unwrap_err();
        assert!(matches!(err, FrontierError::DataUnavailable { .. }));
    }

    #[test]
    fn zero_trials_is_rejected() {
        let port = fixture_port();
        let err = run_pipeline(
            &port,
            &fixture_symbols(),
            date(2024, 1, 1),
            date(2024, 1, 5),
            &fixture_config(0, 42),
        )
        .unwrap_err();
        assert!(matches!(err, FrontierError::DegenerateInput { .. }));
    }
}
