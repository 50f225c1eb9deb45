//! Process configuration: credentials and output locations.
//!
//! Values come from a `.env` file (if present) and the process environment.
//! Missing credentials are fatal at startup; per-request code never looks at
//! the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::Market;
use crate::error::PipelineError;

pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
pub const GOOGLE_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const OUTPUT_DIR_VAR: &str = "STOCK_INSIGHT_OUTPUT_DIR";
pub const TIMEOUT_VAR: &str = "STOCK_INSIGHT_HTTP_TIMEOUT_SECS";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const FONT_VAR: &str = "STOCK_INSIGHT_FONT";

pub const DEFAULT_OUTPUT_DIR: &str = "images";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub alpha_vantage_key: String,
    /// Only present when narrative generation was requested.
    pub google_api_key: Option<String>,
    pub output_dir: PathBuf,
    pub model: String,
    pub http_timeout: Duration,
    pub font_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from `.env` + environment.
    ///
    /// `require_insight` makes the narrative-generator key mandatory.
    pub fn from_env(require_insight: bool) -> Result<Self, PipelineError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(require_insight, |name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(require_insight: bool, lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let alpha_vantage_key = non_empty(ALPHA_VANTAGE_KEY_VAR).ok_or_else(|| {
            PipelineError::Configuration(format!("Missing {ALPHA_VANTAGE_KEY_VAR} in environment (.env)."))
        })?;

        let google_api_key = non_empty(GOOGLE_KEY_VAR);
        if require_insight && google_api_key.is_none() {
            return Err(PipelineError::Configuration(format!(
                "Missing {GOOGLE_KEY_VAR} in environment (.env)."
            )));
        }

        let http_timeout = match non_empty(TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    PipelineError::Configuration(format!("{TIMEOUT_VAR} must be a whole number of seconds (got '{raw}')."))
                })?;
                Duration::from_secs(secs.max(1))
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            alpha_vantage_key,
            google_api_key,
            output_dir: non_empty(OUTPUT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            model: non_empty(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            http_timeout,
            font_path: non_empty(FONT_VAR).map(PathBuf::from),
        })
    }

    pub fn chart_path_for(&self, ticker: &str, market: Market) -> PathBuf {
        chart_path(&self.output_dir, ticker, market)
    }
}

/// `<dir>/<MARKET>_<TICKER>.png`, one file per (ticker, market) pair.
pub fn chart_path(dir: &Path, ticker: &str, market: Market) -> PathBuf {
    let ticker: String = ticker
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c.to_ascii_uppercase() } else { '_' })
        .collect();
    dir.join(format!("{}_{ticker}.png", market.display_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_quote_key_is_a_configuration_error() {
        let err = AppConfig::from_lookup(false, lookup(&[])).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn insight_key_only_required_when_asked() {
        let vars = [(ALPHA_VANTAGE_KEY_VAR, "av")];
        let cfg = AppConfig::from_lookup(false, lookup(&vars)).unwrap();
        assert_eq!(cfg.alpha_vantage_key, "av");
        assert!(cfg.google_api_key.is_none());

        let err = AppConfig::from_lookup(true, lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains(GOOGLE_KEY_VAR));
    }

    #[test]
    fn defaults_and_overrides() {
        let cfg = AppConfig::from_lookup(true, lookup(&[(ALPHA_VANTAGE_KEY_VAR, "av"), (GOOGLE_KEY_VAR, "g")])).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));

        let cfg = AppConfig::from_lookup(
            false,
            lookup(&[(ALPHA_VANTAGE_KEY_VAR, "av"), (OUTPUT_DIR_VAR, "out"), (TIMEOUT_VAR, "5")]),
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));

        let err = AppConfig::from_lookup(false, lookup(&[(ALPHA_VANTAGE_KEY_VAR, "av"), (TIMEOUT_VAR, "soon")]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn chart_path_is_scoped_per_market_and_ticker() {
        let dir = Path::new("images");
        assert_eq!(chart_path(dir, "reliance", Market::Bse), dir.join("BSE_RELIANCE.png"));
        assert_eq!(chart_path(dir, "AAPL", Market::Nasdaq), dir.join("NASDAQ_AAPL.png"));
        assert_eq!(chart_path(dir, "../x", Market::Nasdaq), dir.join("NASDAQ_.._X.png"));
    }
}
