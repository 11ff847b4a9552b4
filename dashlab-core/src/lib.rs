//! Dashlab Core: domain types, data sources, and metric derivation.
//!
//! This crate contains the UI-agnostic half of the analytics dashboard:
//! - Domain types (time-series tables, requests, metrics, performance targets)
//! - Market-data providers (Yahoo Finance, CSV export) behind one trait
//! - Seeded synthetic sales data
//! - Guarded metric derivation for the Financial, Sales, and Performance views

pub mod data;
pub mod domain;
pub mod metrics;
pub mod rng;
