//! Domain types: tables, requests, metrics, performance targets.

pub mod metric;
pub mod performance;
pub mod request;
pub mod table;

pub use metric::{format_currency, Metric, MetricStatus, MetricUnit, NO_DATA_DISPLAY};
pub use performance::{default_targets, GaugeSpec, PerformanceTarget, GAUGE_HEADROOM};
pub use request::{AnalysisMode, AnalysisRequest, RequestError, DEFAULT_SYMBOLS};
pub use table::{fields, FieldValue, TableError, TimeSeriesRow, TimeSeriesTable};
