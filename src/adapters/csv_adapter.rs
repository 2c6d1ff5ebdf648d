//! Wide-format CSV price adapter.
//!
//! Expects `date,SYM1,SYM2,...` with ISO dates and close prices; blank cells
//! are gaps the adapter fills during alignment.

use crate::domain::error::FrontierError;
use crate::domain::prices::PriceMatrix;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PricePort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMatrix, FrontierError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| {
            FrontierError::unavailable(format!(
                "failed to open {}: {e}",
                self.path.display()
            ))
        })?;

        let headers = rdr
            .headers()
            .map_err(|e| FrontierError::unavailable(format!("CSV header error: {e}")))?
            .clone();

        // Column index per requested symbol; a missing column means the file
        // cannot satisfy the request at all.
        let mut columns = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let idx = headers
                .iter()
                .position(|h| h == symbol)
                .ok_or_else(|| {
                    FrontierError::unavailable(format!(
                        "symbol {symbol} not present in {}",
                        self.path.display()
                    ))
                })?;
            columns.push(idx);
        }

        let mut series: Vec<BTreeMap<NaiveDate, f64>> =
            vec![BTreeMap::new(); symbols.len()];
        for result in rdr.records() {
            let record = result
                .map_err(|e| FrontierError::unavailable(format!("CSV parse error: {e}")))?;
            let date_str = record.get(0).ok_or_else(|| {
                FrontierError::unavailable("missing date column".to_string())
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                FrontierError::unavailable(format!("invalid date {date_str}: {e}"))
            })?;
            if date < start || date > end {
                continue;
            }

            for (slot, &col) in columns.iter().enumerate() {
                if let Some(cell) = record.get(col) {
                    if let Ok(price) = cell.trim().parse::<f64>() {
                        series[slot].insert(date, price);
                    }
                }
            }
        }

        PriceMatrix::from_series(symbols.to_vec(), &series)
    }
}
