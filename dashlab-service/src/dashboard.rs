//! DashboardController: validate, fetch (memoized), derive.
//!
//! One call to `compute_dashboard` is one user interaction. Invalid requests
//! are rejected before any provider is touched; provider failures are carried
//! in `Dashboard::diagnostics` and never turn into an `Err`.

use chrono::NaiveDate;
use dashlab_core::data::{DataError, DataOrigin, DataSource, Sourced};
use dashlab_core::domain::{
    AnalysisMode, AnalysisRequest, GaugeSpec, Metric, PerformanceTarget, RequestError,
    TimeSeriesTable,
};
use dashlab_core::metrics::{
    daily_sales_series, financial_metrics, gauge_specs, sales_by_region, sales_metrics,
    RegionSales, SeriesPoint,
};
use dashlab_core::rng::SeedPolicy;
use serde::Serialize;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::memo::{MemoCache, MemoKey, MemoStats};

/// View-specific output beyond the metric cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardExtras {
    Financial,
    Sales {
        by_region: Vec<RegionSales>,
        daily_series: Vec<SeriesPoint>,
    },
    Performance {
        gauges: Vec<GaugeSpec>,
    },
}

/// Everything a renderer needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub request: AnalysisRequest,
    pub table: Arc<TimeSeriesTable>,
    pub metrics: Vec<Metric>,
    pub extras: DashboardExtras,
    pub origin: DataOrigin,
    /// Provider failures that were turned into an empty table.
    pub diagnostics: Vec<String>,
}

impl Dashboard {
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub struct DashboardController {
    source: DataSource,
    allowed_symbols: Vec<String>,
    targets: Vec<PerformanceTarget>,
    memo: MemoCache,
}

impl DashboardController {
    pub fn new(
        source: DataSource,
        allowed_symbols: Vec<String>,
        targets: Vec<PerformanceTarget>,
    ) -> Self {
        Self {
            source,
            allowed_symbols,
            targets,
            memo: MemoCache::new(),
        }
    }

    /// Build the provider and seed policy described by `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, DataError> {
        let provider = config.provider.build()?;
        let source = DataSource::new(provider, SeedPolicy::from_option(config.seed));
        Ok(Self::new(
            source,
            config.allowed_symbols.clone(),
            config.performance_targets.clone(),
        ))
    }

    pub fn compute_dashboard(&self, request: &AnalysisRequest) -> Result<Dashboard, RequestError> {
        request.validate(&self.allowed_symbols)?;

        let dashboard = match request.mode {
            AnalysisMode::Financial => {
                // validate() guarantees a symbol for Financial.
                let symbol = request.symbol.as_deref().unwrap_or_default();
                let sourced = self.memoized(request, || {
                    self.source.fetch_financial(symbol, request.start, request.end)
                });
                Dashboard {
                    request: request.clone(),
                    metrics: financial_metrics(&sourced.table),
                    extras: DashboardExtras::Financial,
                    origin: sourced.origin,
                    diagnostics: sourced.diagnostic.into_iter().collect(),
                    table: sourced.table,
                }
            }
            AnalysisMode::Sales => {
                let sourced = self.memoized(request, || {
                    self.source.generate_sales(request.start, request.end)
                });
                Dashboard {
                    request: request.clone(),
                    metrics: sales_metrics(&sourced.table),
                    extras: DashboardExtras::Sales {
                        by_region: sales_by_region(&sourced.table),
                        daily_series: daily_sales_series(&sourced.table),
                    },
                    origin: sourced.origin,
                    diagnostics: sourced.diagnostic.into_iter().collect(),
                    table: sourced.table,
                }
            }
            AnalysisMode::Performance => Dashboard {
                request: request.clone(),
                table: Arc::new(TimeSeriesTable::empty(&[])),
                metrics: Vec::new(),
                extras: DashboardExtras::Performance {
                    gauges: gauge_specs(&self.targets),
                },
                origin: DataOrigin::Static,
                diagnostics: Vec::new(),
            },
        };

        tracing::info!(
            mode = %request.mode,
            symbol = ?request.symbol,
            provider = self.source.provider_name(),
            rows = dashboard.table.len(),
            metrics = dashboard.metrics.len(),
            diagnostics = dashboard.diagnostics.len(),
            "dashboard computed"
        );
        Ok(dashboard)
    }

    /// Build the request from its parts and compute it.
    pub fn compute_range(
        &self,
        mode: AnalysisMode,
        symbol: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Dashboard, RequestError> {
        let request = AnalysisRequest {
            mode,
            symbol: symbol.map(String::from),
            start,
            end,
        };
        self.compute_dashboard(&request)
    }

    pub fn clear_cache(&self) {
        self.memo.clear();
    }

    pub fn cache_stats(&self) -> MemoStats {
        self.memo.stats()
    }

    fn memoized(&self, request: &AnalysisRequest, compute: impl FnOnce() -> Sourced) -> Sourced {
        self.memo.get_or_insert_with(MemoKey::from(request), compute)
    }
}
