use std::path::{Path, PathBuf};

use thiserror::Error;

/// Provider fields that explain why a payload has no series (rate limits, bad symbols).
const DIAGNOSTIC_KEYS: [&str; 3] = ["Note", "Information", "Error Message"];

/// Failures of a single chart/analysis request.
///
/// Every variant is terminal for the invocation that raised it; nothing retries.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The expected series key is missing from the provider response.
    #[error("{}", data_unavailable_message(.series_key, .payload))]
    DataUnavailable {
        series_key: String,
        payload: serde_json::Value,
    },

    /// A value in the provider response could not be coerced to its expected type.
    #[error("malformed record for {date}: field '{field}' has invalid value '{value}'")]
    MalformedRecord {
        date: String,
        field: String,
        value: String,
    },

    #[error("quote request failed: {0}")]
    Fetch(String),

    #[error("failed to render chart '{}': {message}", .path.display())]
    Render { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("insight generation failed: {0}")]
    Insight(String),
}

impl PipelineError {
    pub fn malformed(date: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedRecord {
            date: date.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn render(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Render {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Provider-supplied explanation carried by a `DataUnavailable` payload, if any.
    pub fn provider_note(&self) -> Option<&str> {
        match self {
            Self::DataUnavailable { payload, .. } => provider_note(payload),
            _ => None,
        }
    }
}

fn provider_note(payload: &serde_json::Value) -> Option<&str> {
    DIAGNOSTIC_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(|v| v.as_str()))
}

fn data_unavailable_message(series_key: &str, payload: &serde_json::Value) -> String {
    let mut msg = format!(
        "no '{series_key}' in provider response (check the ticker symbol, market, or API limits)"
    );
    if let Some(note) = provider_note(payload) {
        msg.push_str(": ");
        msg.push_str(note);
    }
    msg
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match err {
            PipelineError::Configuration(_) => 2,
            _ => 4,
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
