//! Market-data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources (Yahoo Finance,
//! CSV export) so the data source can swap implementations and tests can
//! inject a static provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{fields, TimeSeriesRow, TimeSeriesTable};

/// Raw daily OHLCV bar as delivered by a provider.
///
/// Missing prices and volumes are NaN; they read as gaps once in a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl RawBar {
    fn into_row(self) -> TimeSeriesRow {
        TimeSeriesRow::new(self.date)
            .with(fields::OPEN, self.open)
            .with(fields::HIGH, self.high)
            .with(fields::LOW, self.low)
            .with(fields::CLOSE, self.close)
            .with(fields::VOLUME, self.volume)
    }
}

/// Convert provider bars into an OHLCV table, ascending by date.
pub fn bars_to_table(bars: Vec<RawBar>) -> TimeSeriesTable {
    let rows = bars.into_iter().map(RawBar::into_row).collect();
    // Every row is built from the OHLCV schema, so construction cannot fail.
    TimeSeriesTable::new(&fields::OHLCV, rows)
        .unwrap_or_else(|_| TimeSeriesTable::empty(&fields::OHLCV))
}

/// Structured error types for data operations.
///
/// Displayable as a one-line diagnostic next to a "no data" card.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("provider {provider} is unavailable")]
    ProviderUnavailable { provider: String },

    #[error("csv error: {0}")]
    CsvError(String),

    #[error("sample generation failed: {0}")]
    Generation(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub origin: DataOrigin,
}

/// Where a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    YahooFinance,
    CsvImport,
    Synthetic,
    /// Fixed reference data (performance targets) or an in-memory test provider.
    Static,
}

/// Trait for market-data providers (Yahoo Finance, CSV export, etc).
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Provenance tag for tables built from this provider.
    fn origin(&self) -> DataOrigin;

    /// Fetch daily OHLCV bars for a symbol over an inclusive date range.
    ///
    /// A range without trading days is `Ok` with no bars, not an error.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}
