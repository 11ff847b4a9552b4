//! DataSource: one entry point for external and synthetic tables.
//!
//! Provider failures never escape: they become an empty table plus a
//! diagnostic, so every dashboard view can still render its "no data" cards.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use super::provider::{bars_to_table, DataError, DataOrigin, DataProvider};
use super::sales::generate_sales;
use crate::domain::{fields, TimeSeriesTable};
use crate::rng::SeedPolicy;

/// A table together with where it came from. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced {
    pub table: Arc<TimeSeriesTable>,
    pub origin: DataOrigin,
    /// Set when the table is empty because the source failed.
    pub diagnostic: Option<String>,
}

impl Sourced {
    fn failed(schema: &[&str], origin: DataOrigin, err: &DataError) -> Self {
        Self {
            table: Arc::new(TimeSeriesTable::empty(schema)),
            origin,
            diagnostic: Some(err.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.diagnostic.is_some()
    }
}

pub struct DataSource {
    provider: Box<dyn DataProvider>,
    seed: SeedPolicy,
}

impl DataSource {
    pub fn new(provider: Box<dyn DataProvider>, seed: SeedPolicy) -> Self {
        Self { provider, seed }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Daily OHLCV bars for `symbol` in `[start, end]`.
    ///
    /// A provider that reports itself unavailable (e.g. an open circuit
    /// breaker) is not called at all.
    pub fn fetch_financial(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Sourced {
        if !self.provider.is_available() {
            let err = DataError::ProviderUnavailable {
                provider: self.provider.name().to_string(),
            };
            tracing::warn!(symbol, error = %err, "skipping market data fetch");
            return Sourced::failed(&fields::OHLCV, self.provider.origin(), &err);
        }

        match self.provider.fetch(symbol, start, end) {
            Ok(result) => {
                // Providers may return a wider window; clip to the requested range.
                let table = bars_to_table(result.bars).between(start, end);
                tracing::debug!(
                    symbol,
                    provider = self.provider.name(),
                    rows = table.len(),
                    "fetched market data"
                );
                Sourced {
                    table: Arc::new(table),
                    origin: result.origin,
                    diagnostic: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    symbol,
                    provider = self.provider.name(),
                    error = %err,
                    "market data fetch failed, continuing with empty table"
                );
                Sourced::failed(&fields::OHLCV, self.provider.origin(), &err)
            }
        }
    }

    /// Synthetic sales table for `[start, end]`, seeded per the configured policy.
    pub fn generate_sales(&self, start: NaiveDate, end: NaiveDate) -> Sourced {
        let mut rng = self.seed.rng_for(start, end);
        match generate_sales(start, end, &mut rng) {
            Ok(table) => {
                tracing::debug!(rows = table.len(), seed = ?self.seed, "generated sales data");
                Sourced {
                    table: Arc::new(table),
                    origin: DataOrigin::Synthetic,
                    diagnostic: None,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "sales generation failed");
                Sourced::failed(&fields::SALES_SCHEMA, DataOrigin::Synthetic, &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{FetchResult, RawBar};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingProvider;

    impl DataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn origin(&self) -> DataOrigin {
            DataOrigin::Static
        }

        fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
            Err(DataError::NetworkUnreachable("connection refused".into()))
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    struct WideProvider;

    impl DataProvider for WideProvider {
        fn name(&self) -> &str {
            "wide"
        }

        fn origin(&self) -> DataOrigin {
            DataOrigin::Static
        }

        fn fetch(&self, symbol: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
            let bars = (1..=5)
                .map(|d| RawBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                    open: 10.0,
                    high: 11.0,
                    low: 9.0,
                    close: 10.5,
                    volume: 100.0,
                })
                .collect();
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars,
                origin: DataOrigin::Static,
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    static BLOCKED_FETCHES: AtomicUsize = AtomicUsize::new(0);

    /// Reports itself unavailable; counts any fetch that gets through anyway.
    struct BlockedProvider;

    impl DataProvider for BlockedProvider {
        fn name(&self) -> &str {
            "blocked"
        }

        fn origin(&self) -> DataOrigin {
            DataOrigin::YahooFinance
        }

        fn fetch(&self, symbol: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
            BLOCKED_FETCHES.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars: Vec::new(),
                origin: DataOrigin::YahooFinance,
            })
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn provider_failure_becomes_empty_table_with_diagnostic() {
        let source = DataSource::new(Box::new(FailingProvider), SeedPolicy::Fixed(1));
        let sourced = source.fetch_financial("AAPL", jan(1), jan(31));

        assert!(sourced.table.is_empty());
        assert!(sourced.table.has_field(fields::CLOSE));
        assert!(sourced.is_failure());
        assert!(sourced.diagnostic.unwrap().contains("connection refused"));
    }

    #[test]
    fn provider_rows_are_clipped_to_range() {
        let source = DataSource::new(Box::new(WideProvider), SeedPolicy::Fixed(1));
        let sourced = source.fetch_financial("AAPL", jan(2), jan(4));

        assert_eq!(sourced.table.len(), 3);
        assert_eq!(sourced.origin, DataOrigin::Static);
        assert!(!sourced.is_failure());
    }

    #[test]
    fn seeded_sales_are_reproducible() {
        let source = DataSource::new(Box::new(FailingProvider), SeedPolicy::Fixed(42));
        let a = source.generate_sales(jan(1), jan(3));
        let b = source.generate_sales(jan(1), jan(3));

        assert_eq!(a.table, b.table);
        assert_eq!(a.table.len(), 3);
        assert_eq!(a.origin, DataOrigin::Synthetic);
    }

    #[test]
    fn unavailable_provider_is_not_called() {
        let source = DataSource::new(Box::new(BlockedProvider), SeedPolicy::Entropy);
        let sourced = source.fetch_financial("AAPL", jan(1), jan(31));

        assert!(sourced.table.is_empty());
        assert_eq!(sourced.origin, DataOrigin::YahooFinance);
        assert!(sourced.diagnostic.unwrap().contains("blocked is unavailable"));
        assert_eq!(BLOCKED_FETCHES.load(Ordering::SeqCst), 0);
    }
}
