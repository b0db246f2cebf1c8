//! Gemini API client for report generation
//!
//! The hosted language model behind every prose section. The contract is
//! deliberately narrow: one text prompt in (instructions + data bullets),
//! generated prose out. Prompt construction lives with the sections, and
//! no retry policy applies at this layer.
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::error::ProfileError;
use crate::Result;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Trait for the hosted language model behind each section
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Turn one text prompt (instructions + data bullets) into prose.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            GEMINI_ENDPOINT, self.model, self.api_key
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ProfileError::LlmError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let body = GeminiRequest::single_prompt(prompt);

        info!(model = %self.model, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                ProfileError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(ProfileError::LlmError(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let reply: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            ProfileError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        reply
            .first_text()
            .ok_or_else(|| ProfileError::LlmError("Empty response from Gemini".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GeminiRequest {
    fn single_prompt(text: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

impl Default for GenerationConfig {
    /// Low-temperature settings: section prose must stick to the bullets.
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate, if any.
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest::single_prompt("Write the Key Addresses paragraph.");
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("Key Addresses"));
        assert!(json.contains("\"temperature\":0.3"));
    }

    #[test]
    fn test_first_candidate_text_extracted() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "Prose."}]}}]}"#;
        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_text(), Some("Prose.".to_string()));
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(response.first_text().is_none());

        let no_field: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(no_field.first_text().is_none());
    }

    #[test]
    fn test_endpoint_includes_model_and_key() {
        let client = GeminiClient::with_model("k123".to_string(), "gemini-2.0-flash".to_string());
        let url = client.endpoint();
        assert!(url.contains("/gemini-2.0-flash:generateContent"));
        assert!(url.ends_with("key=k123"));
    }
}
