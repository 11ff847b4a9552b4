//! Metric derivation: pure functions from a table to named metrics.
//!
//! Nothing here fails on data shape. Missing columns and empty tables come
//! back as `NoData` metrics so the renderer can label them.

pub mod financial;
pub mod performance;
pub mod sales;

pub use financial::{
    current_price, financial_metrics, latest_volume, price_change_percent, range_high,
};
pub use performance::gauge_specs;
pub use sales::{
    average_daily_customers, daily_sales_series, sales_by_region, sales_metrics, total_sales,
    RegionSales, SeriesPoint,
};

/// Card titles.
pub mod names {
    pub const CURRENT_PRICE: &str = "Current Price";
    pub const VOLUME: &str = "Volume";
    pub const FIFTY_TWO_WEEK_HIGH: &str = "52-Week High";
    pub const TOTAL_SALES: &str = "Total Sales";
    pub const AVERAGE_DAILY_CUSTOMERS: &str = "Average Daily Customers";
}
