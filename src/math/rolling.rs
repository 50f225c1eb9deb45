//! Trailing moving averages.
//!
//! For window `w`, the value at row `i` is the mean of `close[i-w+1..=i]`.
//! Rows with fewer than `w` observations up to and including `i` have no value.

use crate::domain::QuoteTable;

/// Trailing arithmetic mean of `values` over `window` elements.
///
/// The output has the same length as the input; the first `window - 1` entries
/// (or all entries when `window` is zero or exceeds the length) are `None`.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }
    for (i, chunk) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(chunk.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Populate `ma_short` / `ma_long` from the table's `close` column.
///
/// Existing moving-average values are overwritten, so reapplying with the same
/// windows leaves the table unchanged.
pub fn add_moving_averages(table: &mut QuoteTable, short_window: usize, long_window: usize) {
    let closes = table.closes();
    let short = trailing_mean(&closes, short_window);
    let long = trailing_mean(&closes, long_window);

    for ((row, s), l) in table.rows.iter_mut().zip(short).zip(long) {
        row.ma_short = s;
        row.ma_long = l;
    }
    table.ma_windows = Some((short_window, long_window));
}
