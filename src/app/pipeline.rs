//! Shared chart pipeline used by both CLI and TUI front-ends.
//!
//! quote fetch -> normalize -> moving averages -> render [-> narrative]
//!
//! Each step short-circuits on failure; nothing is retried and no partial
//! result is reported as success.

use std::path::Path;

use tracing::info;

use crate::chart;
use crate::data::{DAILY_SERIES_KEY, QuoteProvider, normalize};
use crate::domain::{ChartArtifact, ChartRequest, LONG_WINDOW, Market, QuoteTable, SHORT_WINDOW};
use crate::error::PipelineError;
use crate::insight::{InsightGenerator, InsightRequest, Narrative};
use crate::math::add_moving_averages;

/// Outputs of one chart run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ticker: String,
    pub market: Market,
    pub table: QuoteTable,
    pub artifact: ChartArtifact,
}

/// Outputs of one full analysis (chart + narrative).
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub run: RunOutput,
    pub narrative: Narrative,
}

/// Fetch, normalize, augment and render one ticker's daily chart.
pub fn run(
    ticker: &str,
    market: Market,
    quotes: &dyn QuoteProvider,
    output_path: &Path,
) -> Result<RunOutput, PipelineError> {
    let ticker = ticker.trim().to_ascii_uppercase();
    info!(%ticker, %market, "starting chart pipeline");

    let payload = quotes.fetch_daily(&ticker, market)?;
    let mut table = normalize(payload, DAILY_SERIES_KEY)?;
    add_moving_averages(&mut table, SHORT_WINDOW, LONG_WINDOW);

    let request = ChartRequest::new(ticker, market, output_path);
    let path = chart::render(&table, &request)?;
    info!(ticker = %request.ticker, %market, rows = table.len(), path = %path.display(), "chart pipeline finished");

    Ok(RunOutput {
        ticker: request.ticker,
        market,
        table,
        artifact: ChartArtifact { path },
    })
}

/// `run`, then ask `insights` to narrate the rendered chart.
pub fn analyze(
    ticker: &str,
    market: Market,
    quotes: &dyn QuoteProvider,
    insights: &dyn InsightGenerator,
    output_path: &Path,
) -> Result<AnalysisOutput, PipelineError> {
    let run = run(ticker, market, quotes, output_path)?;
    let narrative = insights.generate(&InsightRequest {
        image_path: run.artifact.path(),
        ticker: &run.ticker,
        market: run.market,
    })?;
    info!(fragments = narrative.fragments().len(), "narrative received");

    Ok(AnalysisOutput { run, narrative })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use chrono::{Duration, NaiveDate};
    use serde_json::{Map, Value, json};

    struct FakeQuotes {
        payload: Value,
        seen: RefCell<Vec<(String, Market)>>,
    }

    impl FakeQuotes {
        fn new(payload: Value) -> Self {
            Self {
                payload,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl QuoteProvider for FakeQuotes {
        fn fetch_daily(&self, ticker: &str, market: Market) -> Result<Value, PipelineError> {
            self.seen.borrow_mut().push((ticker.to_string(), market));
            Ok(self.payload.clone())
        }
    }

    struct FailingQuotes;

    impl QuoteProvider for FailingQuotes {
        fn fetch_daily(&self, _: &str, _: Market) -> Result<Value, PipelineError> {
            Err(PipelineError::Fetch("connection refused".to_string()))
        }
    }

    struct FakeInsights;

    impl InsightGenerator for FakeInsights {
        fn generate(&self, request: &InsightRequest<'_>) -> Result<Narrative, PipelineError> {
            assert!(request.image_path.exists());
            Ok(Narrative::from_fragments(vec![
                format!("{} ", request.ticker),
                format!("on {}", request.market),
            ]))
        }
    }

    fn daily_payload(days: usize, close: f64) -> Value {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut series = Map::new();
        // Newest first, like the provider.
        for i in (0..days).rev() {
            let date = start + Duration::days(i as i64);
            series.insert(
                date.to_string(),
                json!({
                    "1. open": format!("{close}"),
                    "2. high": format!("{}", close + 1.0),
                    "3. low": format!("{}", close - 1.0),
                    "4. close": format!("{close}"),
                    "5. volume": "1000"
                }),
            );
        }
        json!({ "Time Series (Daily)": Value::Object(series) })
    }

    #[test]
    fn run_produces_augmented_table_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("NASDAQ_IBM.png");
        let quotes = FakeQuotes::new(daily_payload(25, 100.0));

        let run = run(" ibm ", Market::Nasdaq, &quotes, &out).unwrap();

        assert_eq!(quotes.seen.borrow().as_slice(), &[("IBM".to_string(), Market::Nasdaq)]);
        assert_eq!(run.ticker, "IBM");
        assert_eq!(run.artifact.path(), out.as_path());
        assert!(out.exists());
        assert_eq!(run.table.len(), 25);
        assert!(run.table.rows.windows(2).all(|w| w[0].date < w[1].date));
        for row in &run.table.rows[19..] {
            assert!((row.ma_short.unwrap() - 100.0).abs() < 1e-9);
            assert!((row.ma_long.unwrap() - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn missing_series_stops_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("BSE_NOPE.png");
        let quotes = FakeQuotes::new(json!({ "Note": "rate limit" }));

        let err = run("NOPE", Market::Bse, &quotes, &out).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn fetch_failure_is_reported_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let err = run("AAPL", Market::Nasdaq, &FailingQuotes, &dir.path().join("x.png")).unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(_)));
    }

    #[test]
    fn render_failure_surfaces_as_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no-such-dir").join("chart.png");
        let quotes = FakeQuotes::new(daily_payload(5, 10.0));

        let err = run("AAPL", Market::Nasdaq, &quotes, &out).unwrap_err();
        assert!(matches!(err, PipelineError::Render { .. }));
    }

    #[test]
    fn analyze_concatenates_narrative() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("BSE_TCS.png");
        let quotes = FakeQuotes::new(daily_payload(30, 50.0));

        let analysis = analyze("tcs", Market::Bse, &quotes, &FakeInsights, &out).unwrap();
        assert_eq!(analysis.narrative.text(), "TCS on BSE");
        assert_eq!(analysis.run.table.len(), 30);
    }
}
