//! Plain-text summaries of a normalized price table.
//!
//! Formatting lives here so the CLI and the TUI print the same numbers.

use chrono::NaiveDate;

use crate::domain::{Market, QuoteTable};

/// Headline numbers for a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub last_close: f64,
    /// Change of the last close versus the first close, in percent.
    pub change_pct: Option<f64>,
    pub last_ma_short: Option<f64>,
    pub last_ma_long: Option<f64>,
    pub high: f64,
    pub low: f64,
}

/// `None` for an empty table.
pub fn summarize(table: &QuoteTable) -> Option<TableSummary> {
    let first = table.rows.first()?;
    let last = table.rows.last()?;

    let change_pct = (first.close != 0.0).then(|| (last.close / first.close - 1.0) * 100.0);
    let high = table.rows.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max);
    let low = table.rows.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);

    Some(TableSummary {
        rows: table.len(),
        first_date: first.date,
        last_date: last.date,
        last_close: last.close,
        change_pct,
        last_ma_short: last.ma_short,
        last_ma_long: last.ma_long,
        high,
        low,
    })
}

/// Multi-line summary for terminal output.
pub fn format_summary(ticker: &str, market: Market, table: &QuoteTable) -> String {
    let Some(s) = summarize(table) else {
        return format!("{ticker} ({market}): no data\n");
    };
    let (short, long) = table.ma_windows.unwrap_or((crate::domain::SHORT_WINDOW, crate::domain::LONG_WINDOW));

    let mut out = String::new();
    out.push_str(&format!("=== {ticker} ({market}) ===\n"));
    out.push_str(&format!("Rows: {} | {} .. {}\n", s.rows, s.first_date, s.last_date));
    out.push_str(&format!(
        "Last close: {:.2} ({}) | range: [{:.2}, {:.2}]\n",
        s.last_close,
        fmt_pct(s.change_pct),
        s.low,
        s.high
    ));
    out.push_str(&format!(
        "{short}-day MA: {} | {long}-day MA: {}\n",
        fmt_opt(s.last_ma_short),
        fmt_opt(s.last_ma_long)
    ));
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map(|v| format!("{v:+.2}%")).unwrap_or_else(|| "-".to_string())
}
