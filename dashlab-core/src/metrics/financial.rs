//! Financial metrics over an OHLCV table.
//!
//! Each metric is derived on its own: a missing column or an empty table
//! turns that one card into `NoData` and leaves the others untouched.

use crate::domain::{fields, Metric, MetricUnit, TimeSeriesTable};

use super::names;

/// Last row's Close. `None` for an empty table, a missing column, or a gap.
pub fn current_price(table: &TimeSeriesTable) -> Option<f64> {
    table.last()?.number(fields::CLOSE)
}

/// Percent change of the last Close against the one before it.
///
/// With fewer than two rows (or no usable previous Close) the previous price
/// is taken to be the current one, giving 0. A previous Close of exactly 0
/// also gives 0 rather than infinity.
pub fn price_change_percent(table: &TimeSeriesTable) -> Option<f64> {
    let current = current_price(table)?;
    let previous = table
        .previous()
        .and_then(|row| row.number(fields::CLOSE))
        .unwrap_or(current);

    if previous == 0.0 {
        return Some(0.0);
    }
    Some((current - previous) / previous * 100.0)
}

/// Last row's Volume.
pub fn latest_volume(table: &TimeSeriesTable) -> Option<f64> {
    table.last()?.number(fields::VOLUME)
}

/// Maximum High over every row of the table.
///
/// Shown as the "52-Week High" card, but the window is the requested date
/// range, not a rolling 52 weeks.
pub fn range_high(table: &TimeSeriesTable) -> Option<f64> {
    table
        .numbers(fields::HIGH)?
        .into_iter()
        .reduce(f64::max)
}

/// Current Price (with percent-change delta), Volume, and 52-Week High cards.
pub fn financial_metrics(table: &TimeSeriesTable) -> Vec<Metric> {
    let price = match (current_price(table), price_change_percent(table)) {
        (Some(price), Some(change)) => {
            Metric::ok(names::CURRENT_PRICE, price, MetricUnit::Currency).with_delta(change)
        }
        _ => Metric::no_data(names::CURRENT_PRICE, MetricUnit::Currency),
    };

    let volume = Metric::from_value(names::VOLUME, latest_volume(table), MetricUnit::Count);
    let high = Metric::from_value(
        names::FIFTY_TWO_WEEK_HIGH,
        range_high(table),
        MetricUnit::Currency,
    );

    vec![price, volume, high]
}
