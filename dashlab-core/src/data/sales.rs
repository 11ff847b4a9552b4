//! Synthetic daily sales data.
//!
//! One row per calendar day: `Sales ~ Normal(1000, 100)`,
//! `Customers ~ UniformInt[50, 200]`, `Region` uniform over four regions.
//! The generator is passed in, so a seeded one makes the table reproducible.

use chrono::NaiveDate;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::provider::DataError;
use crate::domain::{fields, TimeSeriesRow, TimeSeriesTable};

pub const SALES_MEAN: f64 = 1000.0;
pub const SALES_STD_DEV: f64 = 100.0;
pub const MIN_CUSTOMERS: u32 = 50;
pub const MAX_CUSTOMERS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::East, Region::West];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate one sales row per day in `[start, end]` inclusive.
///
/// An inverted range produces an empty table.
pub fn generate_sales<R: Rng + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut R,
) -> Result<TimeSeriesTable, DataError> {
    let sales_dist =
        Normal::new(SALES_MEAN, SALES_STD_DEV).map_err(|e| DataError::Generation(e.to_string()))?;

    let mut rows = Vec::new();
    let mut day = Some(start);
    while let Some(date) = day.filter(|d| *d <= end) {
        let sales = sales_dist.sample(rng);
        let customers = rng.gen_range(MIN_CUSTOMERS..=MAX_CUSTOMERS);
        let region = Region::ALL[rng.gen_range(0..Region::ALL.len())];

        rows.push(
            TimeSeriesRow::new(date)
                .with(fields::SALES, sales)
                .with(fields::CUSTOMERS, f64::from(customers))
                .with(fields::REGION, region.as_str()),
        );
        day = date.succ_opt();
    }

    TimeSeriesTable::new(&fields::SALES_SCHEMA, rows)
        .map_err(|e| DataError::Generation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_row_per_calendar_day() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = generate_sales(date(2024, 2, 27), date(2024, 3, 2), &mut rng).unwrap();

        // 2024 is a leap year: Feb 27, 28, 29, Mar 1, 2
        assert_eq!(table.len(), 5);
        assert_eq!(table.first().unwrap().timestamp, date(2024, 2, 27));
        assert_eq!(table.last().unwrap().timestamp, date(2024, 3, 2));
    }

    #[test]
    fn same_seed_same_table() {
        let a = generate_sales(date(2024, 1, 1), date(2024, 1, 31), &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = generate_sales(date(2024, 1, 1), date(2024, 1, 31), &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn values_respect_their_distributions() {
        let mut rng = StdRng::seed_from_u64(3);
        let table = generate_sales(date(2023, 1, 1), date(2023, 12, 31), &mut rng).unwrap();
        assert_eq!(table.len(), 365);

        for row in table.rows() {
            let customers = row.number(fields::CUSTOMERS).unwrap();
            assert!((50.0..=200.0).contains(&customers));
            assert_eq!(customers.fract(), 0.0);

            let region = row.text(fields::REGION).unwrap();
            assert!(Region::ALL.iter().any(|r| r.as_str() == region));
        }

        let sales = table.numbers(fields::SALES).unwrap();
        let mean = sales.iter().sum::<f64>() / sales.len() as f64;
        assert!((mean - SALES_MEAN).abs() < 25.0, "mean drifted: {mean}");
    }

    #[test]
    fn inverted_range_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = generate_sales(date(2024, 1, 5), date(2024, 1, 1), &mut rng).unwrap();
        assert!(table.is_empty());
        assert!(table.has_field(fields::REGION));
    }
}
