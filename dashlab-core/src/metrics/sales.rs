//! Sales metrics over a `Sales, Customers, Region` table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{fields, Metric, MetricUnit, TimeSeriesTable};

use super::names;

/// Summed sales for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSales {
    pub region: String,
    pub total: f64,
}

/// One point of the daily sales chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Sum of Sales. An empty table sums to 0; `None` only when the column is absent
/// from a non-empty table.
pub fn total_sales(table: &TimeSeriesTable) -> Option<f64> {
    if table.is_empty() {
        return Some(0.0);
    }
    table.numbers(fields::SALES).map(|v| v.iter().sum())
}

/// Mean of Customers. Undefined (`None`) for an empty table.
pub fn average_daily_customers(table: &TimeSeriesTable) -> Option<f64> {
    let customers = table.numbers(fields::CUSTOMERS)?;
    if customers.is_empty() {
        return None;
    }
    Some(customers.iter().sum::<f64>() / customers.len() as f64)
}

/// Sales summed per region, largest total first (ties by region name).
///
/// Rows without a region or a sales value are left out.
pub fn sales_by_region(table: &TimeSeriesTable) -> Vec<RegionSales> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in table.rows() {
        if let (Some(region), Some(sales)) = (row.text(fields::REGION), row.number(fields::SALES)) {
            *totals.entry(region).or_insert(0.0) += sales;
        }
    }

    let mut grouped: Vec<RegionSales> = totals
        .into_iter()
        .map(|(region, total)| RegionSales {
            region: region.to_string(),
            total,
        })
        .collect();
    grouped.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.region.cmp(&b.region)));
    grouped
}

/// `(date, Sales)` pairs in table order, unmodified.
pub fn daily_sales_series(table: &TimeSeriesTable) -> Vec<SeriesPoint> {
    table
        .series(fields::SALES)
        .into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect()
}

/// Total Sales and Average Daily Customers cards.
pub fn sales_metrics(table: &TimeSeriesTable) -> Vec<Metric> {
    let total = Metric::from_value(names::TOTAL_SALES, total_sales(table), MetricUnit::Currency);
    let customers = Metric::from_value(
        names::AVERAGE_DAILY_CUSTOMERS,
        average_daily_customers(table),
        MetricUnit::Rounded,
    );
    vec![total, customers]
}
