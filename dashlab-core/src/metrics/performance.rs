//! Gauge specs for Performance mode. Inputs are static, so there are no guards.

use crate::domain::{GaugeSpec, PerformanceTarget};

pub fn gauge_specs(targets: &[PerformanceTarget]) -> Vec<GaugeSpec> {
    targets.iter().map(GaugeSpec::from).collect()
}
