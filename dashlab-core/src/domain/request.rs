//! Analysis requests and their validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Symbols the dashboard offers by default.
pub const DEFAULT_SYMBOLS: [&str; 4] = ["AAPL", "GOOGL", "MSFT", "AMZN"];

/// Which dashboard view is being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Financial,
    Sales,
    Performance,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisMode::Financial => "Financial Analysis",
            AnalysisMode::Sales => "Sales Analytics",
            AnalysisMode::Performance => "Performance Metrics",
        };
        f.write_str(name)
    }
}

/// Rejected before any data is fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("financial analysis requires a symbol")]
    MissingSymbol,

    #[error("symbol '{symbol}' is not supported (allowed: {allowed})")]
    UnsupportedSymbol { symbol: String, allowed: String },

    #[error("symbol '{symbol}' given for {mode}, which takes no symbol")]
    UnexpectedSymbol { mode: AnalysisMode, symbol: String },
}

/// One user interaction: mode, optional symbol, and an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub symbol: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisRequest {
    pub fn financial(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            mode: AnalysisMode::Financial,
            symbol: Some(symbol.into()),
            start,
            end,
        }
    }

    pub fn sales(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            mode: AnalysisMode::Sales,
            symbol: None,
            start,
            end,
        }
    }

    pub fn performance(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            mode: AnalysisMode::Performance,
            symbol: None,
            start,
            end,
        }
    }

    /// Check the date range and the symbol against `allowed_symbols`.
    ///
    /// A symbol is required for Financial mode and refused for the others.
    /// Symbol matching is case-sensitive.
    pub fn validate(&self, allowed_symbols: &[String]) -> Result<(), RequestError> {
        if self.start > self.end {
            return Err(RequestError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }

        match (self.mode, self.symbol.as_deref()) {
            (AnalysisMode::Financial, None) => Err(RequestError::MissingSymbol),
            (AnalysisMode::Financial, Some(symbol)) => {
                if allowed_symbols.iter().any(|s| s == symbol) {
                    Ok(())
                } else {
                    Err(RequestError::UnsupportedSymbol {
                        symbol: symbol.to_string(),
                        allowed: allowed_symbols.join(", "),
                    })
                }
            }
            (mode, Some(symbol)) => Err(RequestError::UnexpectedSymbol {
                mode,
                symbol: symbol.to_string(),
            }),
            (_, None) => Ok(()),
        }
    }
}
