//! Google Gemini `generateContent` client.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{InsightGenerator, InsightRequest, Narrative, prompt_for};
use crate::config::AppConfig;
use crate::error::PipelineError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Insight(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let api_key = config
            .google_api_key
            .clone()
            .ok_or_else(|| PipelineError::Configuration("Missing GOOGLE_API_KEY in environment (.env).".to_string()))?;
        Self::new(api_key, config.model.clone(), config.http_timeout)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl InsightGenerator for GeminiClient {
    fn generate(&self, request: &InsightRequest<'_>) -> Result<Narrative, PipelineError> {
        let image = std::fs::read(request.image_path).map_err(|e| {
            PipelineError::Insight(format!("failed to read chart '{}': {e}", request.image_path.display()))
        })?;
        let body = build_request(&prompt_for(request.ticker, request.market), &image);

        info!(model = %self.model, ticker = request.ticker, market = %request.market, "requesting narrative");
        let resp = self
            .client
            .post(format!("{}/{}:generateContent", self.base_url, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| PipelineError::Insight(format!("request failed: {}", e.without_url())))?;

        let status = resp.status();
        let parsed: GenerateResponse = resp
            .json()
            .map_err(|e| PipelineError::Insight(format!("failed to parse response ({status}): {}", e.without_url())))?;

        if !status.is_success() {
            let detail = parsed.error.map(|e| e.message).unwrap_or_default();
            return Err(PipelineError::Insight(format!("request failed with status {status}. {detail}")));
        }

        narrative_from_response(parsed)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

fn build_request(prompt: &str, png: &[u8]) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                RequestPart::Text {
                    text: prompt.to_string(),
                },
                RequestPart::Image {
                    inline_data: InlineData {
                        mime_type: "image/png".to_string(),
                        data: BASE64.encode(png),
                    },
                },
            ],
        }],
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Collect every text part of every candidate, in response order.
fn narrative_from_response(resp: GenerateResponse) -> Result<Narrative, PipelineError> {
    if resp.candidates.is_empty() {
        let reason = resp
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(PipelineError::Insight(format!("model produced no analysis: {reason}")));
    }

    let fragments = resp
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect();
    Ok(Narrative::from_fragments(fragments))
}
