//! Session state for the two-screen UI.
//!
//! The session is a small state machine over `Screen`:
//!
//! ```text
//! Input --submit (ok)--> Results --back--> Input
//! Input --submit (err)-> Input (with error status)
//! ```
//!
//! Analysis results live inside `Screen::Results`, so nothing from a previous
//! request survives a transition back to the input form.

use crate::app::pipeline::AnalysisOutput;
use crate::domain::Market;
use crate::error::PipelineError;

const MAX_TICKER_LEN: usize = 20;

/// Input form field with keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ticker,
    Market,
    Submit,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Ticker => Field::Market,
            Field::Market => Field::Submit,
            Field::Submit => Field::Ticker,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Field::Ticker => Field::Submit,
            Field::Market => Field::Ticker,
            Field::Submit => Field::Market,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputForm {
    pub ticker: String,
    pub market: Market,
    pub focus: Field,
}

impl InputForm {
    pub fn push_char(&mut self, c: char) {
        let allowed = c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '&');
        if allowed && self.ticker.len() < MAX_TICKER_LEN {
            self.ticker.push(c.to_ascii_uppercase());
        }
    }

    pub fn pop_char(&mut self) {
        self.ticker.pop();
    }

    pub fn ticker(&self) -> &str {
        self.ticker.trim()
    }
}

#[derive(Debug, Clone)]
pub enum Screen {
    Input,
    Results(Box<AnalysisOutput>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Info(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub form: InputForm,
    pub screen: Screen,
    pub status: Status,
}

impl Session {
    pub fn new(ticker: &str, market: Market) -> Self {
        let mut form = InputForm {
            ticker: String::new(),
            market,
            focus: Field::Ticker,
        };
        for c in ticker.chars() {
            form.push_char(c);
        }
        Self {
            form,
            screen: Screen::Input,
            status: Status::Idle,
        }
    }

    pub fn results(&self) -> Option<&AnalysisOutput> {
        match &self.screen {
            Screen::Results(out) => Some(out),
            Screen::Input => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.screen, Screen::Input) && !self.form.ticker().is_empty()
    }

    /// Run `analyze` for the form's ticker/market and move to the results screen.
    ///
    /// Ignored outside the input screen. Failures keep the input screen and
    /// report the error so the user can correct the form and retry.
    pub fn submit<F>(&mut self, analyze: F)
    where
        F: FnOnce(&str, Market) -> Result<AnalysisOutput, PipelineError>,
    {
        if !matches!(self.screen, Screen::Input) {
            return;
        }
        if self.form.ticker().is_empty() {
            self.status = Status::Error("Enter a ticker symbol first.".to_string());
            return;
        }

        match analyze(self.form.ticker(), self.form.market) {
            Ok(out) => {
                self.status = Status::Info(format!("Chart saved to {}", out.run.artifact.path().display()));
                self.screen = Screen::Results(Box::new(out));
            }
            Err(err) => {
                self.status = Status::Error(match &err {
                    PipelineError::DataUnavailable { .. } => format!(
                        "Failed to retrieve stock data. Please check your ticker symbol, market, or API limits. ({err})"
                    ),
                    _ => err.to_string(),
                });
            }
        }
    }

    /// Leave the results screen; the form keeps its last ticker/market.
    pub fn back(&mut self) {
        if matches!(self.screen, Screen::Results(_)) {
            self.screen = Screen::Input;
            self.status = Status::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartArtifact, QuoteTable};
    use crate::insight::Narrative;
    use crate::app::pipeline::RunOutput;
    use serde_json::json;

    fn output(ticker: &str, market: Market) -> AnalysisOutput {
        AnalysisOutput {
            run: RunOutput {
                ticker: ticker.to_string(),
                market,
                table: QuoteTable::default(),
                artifact: ChartArtifact {
                    path: format!("images/{market}_{ticker}.png").into(),
                },
            },
            narrative: Narrative::from_fragments(vec!["up".to_string()]),
        }
    }

    #[test]
    fn starts_on_input_with_defaults() {
        let s = Session::new("reliance", Market::Bse);
        assert!(matches!(s.screen, Screen::Input));
        assert_eq!(s.form.ticker(), "RELIANCE");
        assert_eq!(s.form.focus, Field::Ticker);
        assert!(s.can_submit());
    }

    #[test]
    fn submit_then_back_round_trips_screens() {
        let mut s = Session::new("AAPL", Market::Nasdaq);
        s.submit(|t, m| {
            assert_eq!((t, m), ("AAPL", Market::Nasdaq));
            Ok(output(t, m))
        });
        let out = s.results().unwrap();
        assert_eq!(out.narrative.text(), "up");
        assert!(matches!(s.status, Status::Info(_)));

        // Submitting again from results does nothing.
        s.submit(|_, _| panic!("must not run"));
        assert!(s.results().is_some());

        s.back();
        assert!(matches!(s.screen, Screen::Input));
        assert_eq!(s.status, Status::Idle);
        assert_eq!(s.form.ticker(), "AAPL");
        assert_eq!(s.form.market, Market::Nasdaq);
    }

    #[test]
    fn failed_submit_stays_on_input_with_error() {
        let mut s = Session::new("NOPE", Market::Bse);
        s.submit(|_, _| {
            Err(PipelineError::DataUnavailable {
                series_key: "Time Series (Daily)".to_string(),
                payload: json!({ "Note": "rate limit" }),
            })
        });
        assert!(matches!(s.screen, Screen::Input));
        match &s.status {
            Status::Error(msg) => {
                assert!(msg.starts_with("Failed to retrieve stock data"));
                assert!(msg.contains("rate limit"));
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn empty_ticker_is_not_submitted() {
        let mut s = Session::new("", Market::Bse);
        assert!(!s.can_submit());
        s.submit(|_, _| panic!("must not run"));
        assert!(matches!(s.status, Status::Error(_)));
    }

    #[test]
    fn ticker_input_filters_and_uppercases() {
        let mut s = Session::new("", Market::Bse);
        for c in "m&m. x!".chars() {
            s.form.push_char(c);
        }
        assert_eq!(s.form.ticker, "M&M.X");
        s.form.pop_char();
        assert_eq!(s.form.ticker, "M&M.");
    }

    #[test]
    fn back_on_input_is_a_no_op() {
        let mut s = Session::new("AAPL", Market::Nasdaq);
        s.status = Status::Error("x".to_string());
        s.back();
        assert!(matches!(s.screen, Screen::Input));
        assert_eq!(s.status, Status::Error("x".to_string()));
    }

    #[test]
    fn focus_cycles() {
        assert_eq!(Field::Ticker.next().next().next(), Field::Ticker);
        assert_eq!(Field::Ticker.prev(), Field::Submit);
    }
}
