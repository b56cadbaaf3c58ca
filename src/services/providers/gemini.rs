/// Gemini REST provider
///
/// Calls the `generateContent` endpoint of the Generative Language API and
/// returns the concatenated text of the first candidate.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    services::providers::{GenerationParams, TextGenerator},
};

// Request timeout for the HTTP client; the recommendation service applies its
// own, tighter deadline around each generation call.
const CLIENT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_url: String, api_key: String, model: String) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            api_url,
            api_key,
            model,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        )
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                max_output_tokens: params.max_output_tokens,
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .http_client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let api_response: GenerateContentResponse = response.json().await?;

        // A successful call can still carry no text (safety-blocked replies
        // come back with empty candidates). That is the caller's problem to
        // recover from, the same as any other unusable reply.
        let text = first_candidate_text(&api_response);
        if text.is_empty() {
            tracing::warn!(model = %self.model, "Gemini API returned no text candidates");
        }

        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Concatenated text of the first candidate, empty when there is none
fn first_candidate_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .map(|candidate| {
            candidate
                .content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_includes_model_and_key() {
        let provider = GeminiProvider::new(
            "http://test.local/v1beta".to_string(),
            "test_key".to_string(),
            "gemini-2.5-flash".to_string(),
        )
        .unwrap();

        assert_eq!(
            provider.generate_url(),
            "http://test.local/v1beta/models/gemini-2.5-flash:generateContent?key=test_key"
        );
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: "hola".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.8,
                top_p: 0.9,
                max_output_tokens: 512,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hola");
        assert!(json["generationConfig"]["temperature"].is_number());
        assert!(json["generationConfig"]["topP"].is_number());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 512);
    }

    #[test]
    fn test_empty_candidates_yield_empty_text() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(first_candidate_text(&parsed), "");

        // Safety-blocked replies carry a candidate with no parts
        let blocked: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[]},"finishReason":"SAFETY"}]}"#,
        )
        .unwrap();
        assert_eq!(first_candidate_text(&blocked), "");
    }

    #[test]
    fn test_response_parses_candidate_text() {
        let body = r#"{
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": "{\"ok\":true}" } ] }, "finishReason": "STOP" }
            ]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.candidates.len(), 1);
        assert_eq!(parsed.candidates[0].content.parts[0].text, "{\"ok\":true}");
    }
}
