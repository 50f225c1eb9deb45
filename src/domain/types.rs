//! Shared domain types.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Trailing window (rows) of the short moving average.
pub const SHORT_WINDOW: usize = 7;
/// Trailing window (rows) of the long moving average.
pub const LONG_WINDOW: usize = 20;

/// Exchange a ticker is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Bse,
    Nasdaq,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Bse, Market::Nasdaq];

    pub fn display_name(self) -> &'static str {
        match self {
            Market::Bse => "BSE",
            Market::Nasdaq => "NASDAQ",
        }
    }

    /// Suffix appended to the ticker in provider requests.
    ///
    /// NASDAQ symbols are sent bare; every other market is qualified.
    pub fn symbol_suffix(self) -> Option<&'static str> {
        match self {
            Market::Bse => Some("BSE"),
            Market::Nasdaq => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Market::Bse => Market::Nasdaq,
            Market::Nasdaq => Market::Bse,
        }
    }

    pub fn prev(self) -> Self {
        // Two markets: stepping either way lands on the other one.
        self.next()
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One trading day of normalized prices.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Trailing mean of `close` over the short window; `None` until enough history exists.
    pub ma_short: Option<f64>,
    /// Trailing mean of `close` over the long window; `None` until enough history exists.
    pub ma_long: Option<f64>,
}

impl QuoteRow {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            ma_short: None,
            ma_long: None,
        }
    }
}

/// Daily prices in ascending date order.
///
/// Invariants (upheld by the normalizer): dates are strictly ascending and every
/// OHLCV value is finite. Moving-average columns are populated by
/// `math::add_moving_averages`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteTable {
    pub rows: Vec<QuoteRow>,
    /// Window sizes `(short, long)` of the moving-average columns, once computed.
    pub ma_windows: Option<(usize, usize)>,
}

impl QuoteTable {
    pub fn new(rows: Vec<QuoteRow>) -> Self {
        Self {
            rows,
            ma_windows: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }
}

/// Identifying metadata for one chart render; `chart::render` pairs it with a `QuoteTable`.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub ticker: String,
    pub market: Market,
    pub output_path: PathBuf,
}

impl ChartRequest {
    pub fn new(ticker: impl Into<String>, market: Market, output_path: impl Into<PathBuf>) -> Self {
        Self {
            ticker: ticker.into(),
            market,
            output_path: output_path.into(),
        }
    }
}

/// A rendered chart image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub path: PathBuf,
}

impl ChartArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }
}
