//! Metric: a named derived value ready for a metric card.

use serde::{Deserialize, Serialize};

/// Placeholder shown on a card with no value.
pub const NO_DATA_DISPLAY: &str = "N/A";

/// Whether a metric could be derived.
///
/// `NoData` is an expected, valid outcome (empty table, missing field) and
/// is never treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricStatus {
    Ok,
    NoData,
    Error { message: String },
}

/// How a metric value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    /// `$1,234.56`
    Currency,
    /// `1,234,567`
    Count,
    /// `1234`, rounded to an integer
    Rounded,
}

impl MetricUnit {
    pub fn format(self, value: f64) -> String {
        match self {
            MetricUnit::Currency => format_currency(value),
            MetricUnit::Count => group_thousands(&format!("{value:.0}")),
            MetricUnit::Rounded => format!("{value:.0}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: Option<f64>,
    pub display: String,
    /// Percent change, e.g. `1.5` for +1.5%.
    pub delta: Option<f64>,
    pub unit: MetricUnit,
    #[serde(flatten)]
    pub status: MetricStatus,
}

impl Metric {
    pub fn ok(name: &str, value: f64, unit: MetricUnit) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value),
            display: unit.format(value),
            delta: None,
            unit,
            status: MetricStatus::Ok,
        }
    }

    pub fn no_data(name: &str, unit: MetricUnit) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            display: NO_DATA_DISPLAY.to_string(),
            delta: None,
            unit,
            status: MetricStatus::NoData,
        }
    }

    pub fn error(name: &str, unit: MetricUnit, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            display: NO_DATA_DISPLAY.to_string(),
            delta: None,
            unit,
            status: MetricStatus::Error {
                message: message.into(),
            },
        }
    }

    /// `NoData` for `None`, `Error` for a value that overflowed to inf/NaN,
    /// `Ok` otherwise.
    pub fn from_value(name: &str, value: Option<f64>, unit: MetricUnit) -> Self {
        match value {
            None => Self::no_data(name, unit),
            Some(v) if !v.is_finite() => Self::error(name, unit, format!("{name} is not finite")),
            Some(v) => Self::ok(name, v, unit),
        }
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == MetricStatus::Ok
    }

    pub fn is_no_data(&self) -> bool {
        self.status == MetricStatus::NoData
    }

    /// Delta rendered as `+1.23%`, if any.
    pub fn delta_display(&self) -> Option<String> {
        self.delta.map(|d| format!("{d:+.2}%"))
    }
}

/// `$1,234.56`, with a leading minus for negative amounts.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// Insert `,` every three digits of an integer string (sign preserved).
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}
