//! Static performance targets and the gauge specs derived from them.

use serde::{Deserialize, Serialize};

/// Gauge axis extends this far past the target.
pub const GAUGE_HEADROOM: f64 = 1.2;

/// A KPI with its current value and target. Reference data, not derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTarget {
    pub metric_name: String,
    pub current_value: f64,
    pub target_value: f64,
}

impl PerformanceTarget {
    pub fn new(metric_name: &str, current_value: f64, target_value: f64) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            current_value,
            target_value,
        }
    }
}

/// Value/target/bound triple for a dial-style indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeSpec {
    pub name: String,
    pub value: f64,
    pub target: f64,
    pub upper_bound: f64,
}

impl From<&PerformanceTarget> for GaugeSpec {
    fn from(t: &PerformanceTarget) -> Self {
        Self {
            name: t.metric_name.clone(),
            value: t.current_value,
            target: t.target_value,
            upper_bound: t.target_value * GAUGE_HEADROOM,
        }
    }
}

/// The five predefined KPIs shown in Performance mode.
pub fn default_targets() -> Vec<PerformanceTarget> {
    vec![
        PerformanceTarget::new("Revenue", 1_250_000.0, 1_300_000.0),
        PerformanceTarget::new("Costs", 850_000.0, 800_000.0),
        PerformanceTarget::new("Profit", 400_000.0, 500_000.0),
        PerformanceTarget::new("ROI", 47.0, 50.0),
        PerformanceTarget::new("Customer Satisfaction", 4.2, 4.5),
    ]
}
