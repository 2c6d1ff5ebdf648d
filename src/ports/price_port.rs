//! Historical price provider port trait.

use crate::domain::error::FrontierError;
use crate::domain::prices::PriceMatrix;
use chrono::NaiveDate;

/// Supplies an aligned, gap-free close-price matrix for a set of symbols.
///
/// Implementations align dates, fill small gaps forward then backward, and
/// fail with [`FrontierError::DataUnavailable`] if any requested symbol has
/// no usable data, never silently returning fewer columns than asked for.
pub trait PricePort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMatrix, FrontierError>;
}
