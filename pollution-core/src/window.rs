use chrono::NaiveDate;

use crate::{dataset::TimeSeries, model::Record};

pub const DEFAULT_WINDOW: usize = 10;

/// Trailing slice of up to `window_size` records ending at the record closest
/// to `target`.
///
/// Equidistant candidates resolve to the earlier date. Targets outside the
/// series clamp to the nearest boundary record.
pub fn anchor_window(series: &TimeSeries, target: NaiveDate, window_size: usize) -> &[Record] {
    let records = series.records();
    let index = nearest_index(records, target);
    let start = (index + 1).saturating_sub(window_size.max(1));

    &records[start..=index]
}

fn nearest_index(records: &[Record], target: NaiveDate) -> usize {
    // `min_by_key` keeps the first of several equal minima.
    records
        .iter()
        .enumerate()
        .min_by_key(|(_, r)| (r.date - target).num_days().abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}
