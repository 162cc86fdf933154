//! Gemini `generateContent` client (single-turn, text only).

use super::{LlmError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: Option<String>, model: Option<String>, api_key: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            base_url,
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    /// POST models/{model}:generateContent — returns the text of the first candidate.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured("api key"))?;
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: GenerateResponse = res.json().await?;
        first_candidate_text(data)
    }
}

/// Concatenated text parts of `candidates[0]`; absent candidate or text is malformed.
fn first_candidate_text(data: GenerateResponse) -> Result<String, LlmError> {
    let candidate = data
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Malformed("candidates[0] missing".to_string()))?;
    let content = candidate
        .content
        .ok_or_else(|| LlmError::Malformed("candidates[0].content missing".to_string()))?;
    let texts: Vec<String> = content.parts.into_iter().filter_map(|p| p.text).collect();
    if texts.is_empty() {
        return Err(LlmError::Malformed(
            "candidates[0].content.parts has no text".to_string(),
        ));
    }
    Ok(texts.concat())
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}
