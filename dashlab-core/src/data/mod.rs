//! Data acquisition: market-data providers, synthetic sales, and the DataSource facade.

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod sales;
pub mod source;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{bars_to_table, DataError, DataOrigin, DataProvider, FetchResult, RawBar};
pub use sales::{generate_sales, Region};
pub use source::{DataSource, Sourced};
pub use yahoo::{YahooProvider, YahooSettings};
