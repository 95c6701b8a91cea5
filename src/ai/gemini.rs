// src/ai/gemini.rs
use super::{AiError, TextGenerator};
use crate::types::response::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Error text from a non-2xx body, preferring the structured envelope.
fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let err = envelope.error;
            format!(
                "{} {}: {}",
                err.code.unwrap_or(status.as_u16()),
                err.status.unwrap_or_default(),
                err.message
            )
        }
        Err(_) => format!("{}: {}", status, body),
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        schema: Option<serde_json::Value>,
    ) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::CredentialMissing)?;
        let request = GenerateContentRequest::from_prompt(prompt, schema);

        info!("Sending request to generative-language API ({})", self.model);
        debug!("Prompt: {}", prompt);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Generative-language request failed: {}", e);
                AiError::classify(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Generative-language API error {}: {}", status, error_text);
            return Err(AiError::classify(describe_failure(status, &error_text)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Request(format!("Failed to parse API response: {}", e)))?;

        let text = parsed.text().ok_or(AiError::EmptyResponse)?;
        info!("Received {} characters from generative-language API", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_defaults() {
        let client = GeminiClient::new(None, Some("http://localhost:9000/".to_string()), None, 5)
            .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(!client.has_credential());

        let blank = GeminiClient::new(Some("  ".to_string()), None, None, 5).unwrap();
        assert!(!blank.has_credential());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = GeminiClient::new(None, None, None, 5).unwrap();
        let err = client.generate("hello", None).await.unwrap_err();
        assert!(err.is_credential());
    }

    #[test]
    fn test_describe_failure_reads_envelope() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let text = describe_failure(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(
            text,
            "400 INVALID_ARGUMENT: API key not valid. Please pass a valid API key."
        );
        assert!(AiError::classify(text).is_credential());

        let plain = describe_failure(reqwest::StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        assert!(plain.contains("overloaded"));
        assert!(!AiError::classify(plain).is_credential());
    }
}
