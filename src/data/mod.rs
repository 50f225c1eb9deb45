//! Quote acquisition and normalization.

pub mod alphavantage;
pub mod normalize;

pub use alphavantage::{AlphaVantageClient, QuoteProvider, symbol_for};
pub use normalize::{DAILY_SERIES_KEY, normalize};
