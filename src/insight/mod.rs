//! Narrative analysis of a rendered chart.
//!
//! A generator returns an ordered, finite sequence of text fragments; the
//! displayed analysis is their concatenation in arrival order.

use std::path::Path;

use crate::domain::Market;
use crate::error::PipelineError;

pub mod gemini;

pub use gemini::GeminiClient;

/// What the generator is asked to describe.
#[derive(Debug, Clone, Copy)]
pub struct InsightRequest<'a> {
    pub image_path: &'a Path,
    pub ticker: &'a str,
    pub market: Market,
}

pub trait InsightGenerator {
    fn generate(&self, request: &InsightRequest<'_>) -> Result<Narrative, PipelineError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrative {
    fragments: Vec<String>,
}

impl Narrative {
    pub fn from_fragments(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.is_empty())
    }

    /// All fragments joined in arrival order.
    pub fn text(&self) -> String {
        self.fragments.concat()
    }
}

/// Prompt sent alongside the chart image.
pub fn prompt_for(ticker: &str, market: Market) -> String {
    format!(
        "You are a seasoned equity analyst. The attached image shows daily data for {ticker} listed on {market}: \
         the closing price (top), trading volume (middle), and the closing price with its 7-day and 20-day \
         moving averages (bottom). Describe the price trend, notable volume spikes and what they coincide with, \
         moving-average crossovers and what they suggest about momentum, and any visible support or resistance \
         levels. Finish with a short, balanced outlook. Base the analysis only on the chart."
    )
}
