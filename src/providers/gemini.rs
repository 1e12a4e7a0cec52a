// src/providers/gemini.rs

//! Google Gemini provider (REST `generateContent`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::error::{AppError, Result, StageError};
use crate::models::LlmConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Gemini API client.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: impl Into<String>, config: &LlmConfig) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        }
    }

    /// Build a provider reading the API key from `config.api_key_env`.
    pub fn from_env(client: Client, config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::config(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
        Ok(Self::new(client, api_key, config))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn query(&self, prompt: &str) -> std::result::Result<String, StageError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
            },
        };

        log::debug!("Sending Gemini request to: {}", url);

        let resp = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 | 403 => StageError::Config(format!("Gemini rejected the API key ({status})")),
                429 => StageError::provider("Gemini rate limit exceeded"),
                _ => StageError::provider(format!("Gemini API error ({status}): {error_text}")),
            });
        }

        let gemini_response: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| StageError::provider(format!("failed to parse Gemini response: {e}")))?;

        let candidate = gemini_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| StageError::provider("no candidates returned from Gemini"))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(StageError::provider("content blocked by Gemini safety filters"));
        }

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(StageError::provider("no content parts in Gemini response"));
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GeminiProvider {
        let config = LlmConfig {
            base_url: format!("{}/v1beta/", server.uri()),
            ..LlmConfig::default()
        };
        GeminiProvider::new(Client::new(), "test-key", &config)
    }

    #[tokio::test]
    async fn test_query_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "{\"text\": \"hi\"}"}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let reply = provider_for(&server).query("prompt").await.unwrap();
        assert_eq!(reply, "{\"text\": \"hi\"}");
    }

    #[tokio::test]
    async fn test_rejected_key_is_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = provider_for(&server).query("prompt").await.unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_safety_block_and_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;
        let err = provider_for(&server).query("prompt").await.unwrap_err();
        assert!(matches!(err, StageError::Provider(_)));

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;
        let err = provider_for(&server).query("prompt").await.unwrap_err();
        assert!(matches!(err, StageError::Provider(_)));
    }

    #[test]
    fn test_from_env_requires_key() {
        let config = LlmConfig {
            api_key_env: "ARTICLE_EXTRACTOR_TEST_UNSET_KEY".into(),
            ..LlmConfig::default()
        };
        let result = GeminiProvider::from_env(Client::new(), &config);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
