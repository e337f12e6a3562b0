//! Gemini generateContent 連携
//!
//! 1回の識別 = 1リクエスト。リトライはしない。

use super::{Identifier, ImagePayload};
use crate::config::Config;
use crate::error::{LeafIdError, Result};
use async_trait::async_trait;
use leaf_id_common::{parse_identification, ParsedIdentification, PromptVariant};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("leaf-id/", env!("CARGO_PKG_VERSION"));

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Deserialize, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

fn build_request(variant: PromptVariant, image: &ImagePayload) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text {
                    text: variant.prompt().to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: 0.4,
            response_mime_type: variant.response_mime_type().map(str::to_string),
        },
    }
}

/// candidates[0].content.parts[0].text（空なら None）
fn candidate_text(response: &GeminiResponse) -> Option<&str> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_str())
        .filter(|t| !t.trim().is_empty())
}

/// レスポンス本文 → 識別結果
pub fn parse_response_body(body: &str, variant: PromptVariant) -> Result<ParsedIdentification> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| LeafIdError::ApiCall(format!("レスポンスの解析に失敗: {}", e)))?;
    let text = candidate_text(&response).ok_or(LeafIdError::EmptyResponse)?;

    let parsed = parse_identification(text, variant);
    if !parsed.defaulted.is_empty() {
        tracing::debug!(defaulted = ?parsed.defaulted, "Identification fields filled with defaults");
    }
    Ok(parsed)
}

/// Gemini クライアント
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: String,
    variant: PromptVariant,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LeafIdError::ApiCall(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint(),
            variant: config.prompt_variant,
        })
    }

    /// プロンプトのバリアントを差し替え
    pub fn with_variant(mut self, variant: PromptVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn variant(&self) -> PromptVariant {
        self.variant
    }
}

#[async_trait]
impl Identifier for GeminiClient {
    async fn identify(&self, api_key: &str, image: &ImagePayload) -> Result<ParsedIdentification> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(LeafIdError::MissingApiKey);
        }

        let request = build_request(self.variant, image);
        tracing::debug!(endpoint = %self.endpoint, variant = %self.variant, "Calling identification API");

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| LeafIdError::ApiCall(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LeafIdError::ApiCall(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Identification API returned an error");
            return Err(LeafIdError::ApiCall(format!(
                "HTTP {}: {}\n{}",
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                body
            )));
        }

        let parsed = parse_response_body(&body, self.variant)?;
        tracing::info!(
            common_name = %parsed.common_name,
            scientific_name = %parsed.scientific_name,
            "Leaf identified"
        );
        Ok(parsed)
    }
}
