//! Alpha Vantage daily-close price adapter.
//!
//! One `TIME_SERIES_DAILY` request per symbol over a blocking reqwest
//! client; callers in async contexts run the port behind `spawn_blocking`.

use crate::domain::error::FrontierError;
use crate::domain::prices::PriceMatrix;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const TIME_SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";

pub struct AlphaVantageAdapter {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl AlphaVantageAdapter {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, FrontierError> {
        let url = format!(
            "{}/query?function=TIME_SERIES_DAILY&symbol={}&outputsize=full&apikey={}",
            self.base_url, symbol, self.api_key
        );
        let response = self.client.get(&url).send().map_err(|e| {
            FrontierError::unavailable(format!("request for {symbol} failed: {e}"))
        })?;
        let json: Value = response.json().map_err(|e| {
            FrontierError::unavailable(format!("invalid response for {symbol}: {e}"))
        })?;

        parse_daily_series(&json, start, end).map_err(|reason| {
            FrontierError::unavailable(format!("{symbol}: {reason}"))
        })
    }
}

/// Extract close prices in [start, end] from an Alpha Vantage daily payload.
fn parse_daily_series(
    json: &Value,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeMap<NaiveDate, f64>, String> {
    let series = json[TIME_SERIES_KEY]
        .as_object()
        .ok_or_else(|| "missing daily time series in response".to_string())?;

    let mut closes = BTreeMap::new();
    for (date_str, values) in series {
        let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        let close = values[CLOSE_KEY]
            .as_str()
            .ok_or_else(|| format!("missing close value on {date_str}"))?
            .parse::<f64>()
            .map_err(|e| format!("bad close value on {date_str}: {e}"))?;
        closes.insert(date, close);
    }
    Ok(closes)
}

impl PricePort for AlphaVantageAdapter {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMatrix, FrontierError> {
        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            series.push(self.fetch_symbol(symbol, start, end)?);
        }
        PriceMatrix::from_series(symbols.to_vec(), &series)
    }
}
