#![allow(dead_code)]

use chrono::NaiveDate;
use frontier::domain::error::FrontierError;
use frontier::domain::prices::PriceMatrix;
use frontier::ports::price_port::PricePort;
use std::collections::{BTreeMap, HashMap};

pub struct MockPricePort {
    pub data: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, start: &str, closes: &[f64]) -> Self {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        let series = closes
            .iter()
            .enumerate()
            .map(|(i, &price)| (start + chrono::Duration::days(i as i64), price))
            .collect();
        self.data.insert(symbol.to_string(), series);
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMatrix, FrontierError> {
        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let closes = self.data.get(symbol).ok_or_else(|| {
                FrontierError::DataUnavailable {
                    reason: format!("no data for {symbol}"),
                }
            })?;
            let in_range: BTreeMap<NaiveDate, f64> = closes
                .iter()
                .filter(|(d, _)| **d >= start && **d <= end)
                .map(|(d, p)| (*d, *p))
                .collect();
            series.push(in_range);
        }
        PriceMatrix::from_series(symbols.to_vec(), &series)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two-asset, five-period fixture.
pub fn fixture_port() -> MockPricePort {
    MockPricePort::new()
        .with_closes("AAA", "2024-01-01", &[100.0, 101.0, 102.0, 101.0, 103.0])
        .with_closes("BBB", "2024-01-01", &[50.0, 50.5, 51.0, 50.8, 51.5])
}

pub fn fixture_symbols() -> Vec<String> {
    vec!["AAA".to_string(), "BBB".to_string()]
}
