//! Dashlab Service: dashboard orchestration on top of `dashlab-core`.
//!
//! This crate provides:
//! - `DashboardController`, the per-interaction validate/fetch/derive pipeline
//! - A memo cache keyed by (mode, symbol, start, end)
//! - TOML service configuration and provider construction

pub mod config;
pub mod dashboard;
pub mod memo;

pub use config::{ConfigError, ProviderConfig, ProviderKind, ServiceConfig};
pub use dashboard::{Dashboard, DashboardController, DashboardExtras};
pub use memo::{MemoCache, MemoKey, MemoStats};
