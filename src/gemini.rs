//! Gemini API Client
//!
//! Single request/response text generation against the Gemini
//! `generateContent` REST endpoint. No streaming. The router performs no
//! retries of its own; a bounded request timeout keeps the typing
//! indicator from hanging.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini generation client. Without an API key it reports unavailable and
/// every call is skipped by the router.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<&str>, model: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.map(|s| s.to_string()),
            model: model.to_string(),
        }
    }

    /// Whether an API key is configured
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Submit one prompt, return the generated text. The persona and policy
    /// lines travel inside the prompt itself.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY not set"))?;

        let url = format!("{}/{}:generateContent?key={}", GEMINI_API_BASE, self.model, api_key);

        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}],
            }],
        });

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API {}: {}", status, detail);
        }

        let parsed: GenerateResponse = response.json().await?;
        if let Some(err) = parsed.error {
            anyhow::bail!("Gemini error: {}", err.message);
        }

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_follows_key() {
        assert!(!GeminiClient::new(None, "gemini-2.5-flash").is_available());
        assert!(GeminiClient::new(Some("key"), "gemini-2.5-flash").is_available());
    }

    #[tokio::test]
    async fn test_generate_without_key_errors() {
        let client = GeminiClient::new(None, "gemini-2.5-flash");
        assert!(client.generate("hello").await.is_err());
    }

    #[test]
    fn test_response_text_assembly() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Namaste "}, {"text": "Papa ji"}]}
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        assert_eq!(text, "Namaste Papa ji");
    }
}
