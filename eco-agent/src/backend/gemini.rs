//! Gemini vision backend.
//!
//! Talks to the Google Generative Language `generateContent` endpoint with
//! one text part and one inline image part per request. Any service exposing
//! the same REST shape (e.g. an API gateway in front of it) also works.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::*;

/// Production API endpoint.
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini-compatible vision backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a new backend against a custom base URL.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::with_timeout(base_url, model, api_key, DEFAULT_TIMEOUT)
    }

    /// Create with an explicit per-request timeout.
    ///
    /// Expiry surfaces as [`OracleError::Timeout`]; there is no retry.
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a backend for the production Gemini API.
    pub fn gemini(model: &str, api_key: impl Into<String>) -> Self {
        Self::new(GEMINI_BASE_URL, model, api_key)
    }

    /// Build the generateContent URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    fn map_transport(err: reqwest::Error) -> OracleError {
        if err.is_timeout() {
            OracleError::Timeout
        } else if err.is_connect() {
            OracleError::Unavailable(err.to_string())
        } else {
            OracleError::Network(err.to_string())
        }
    }
}

/// generateContent request body.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
enum Part {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inline_data")]
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// generateContent response body.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

#[async_trait]
impl VisionBackend for GeminiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let url = format!(
            "{}/v1beta/models?key={}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        );

        self.client
            .get(&url)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, OracleError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(request.instruction.clone()),
                    Part::InlineData(InlineData {
                        mime_type: request.image.mime_type.clone(),
                        data: BASE64.encode(&request.image.bytes),
                    }),
                ],
            }],
            generation_config: if request.max_output_tokens.is_some()
                || request.temperature.is_some()
            {
                Some(GenerationConfig {
                    max_output_tokens: request.max_output_tokens,
                    temperature: request.temperature,
                })
            } else {
                None
            },
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(OracleError::RateLimited);
            }

            return Err(OracleError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        let candidate = generated
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::Parse("No candidates in response".to_string()))?;

        let text = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(OracleError::Parse("Empty candidate text".to_string()));
        }

        let usage = generated
            .usage_metadata
            .map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(ClassifyResponse { text, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }],
            "usageMetadata": { "promptTokenCount": 300, "candidatesTokenCount": 40 }
        })
    }

    fn request() -> ClassifyRequest {
        ClassifyRequest::new("Analyze this image.", ImageData::jpeg(vec![0xFF, 0xD8]))
    }

    #[tokio::test]
    async fn test_classify_happy_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("verdict text")))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "gemini-1.5-flash", "test-key");
        let response = backend.classify(request()).await.unwrap();

        assert_eq!(response.text, "verdict text");
        assert_eq!(response.usage.total(), 340);
    }

    #[tokio::test]
    async fn test_classify_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "gemini-1.5-flash", "test-key");
        let result = backend.classify(request()).await;

        assert!(matches!(result, Err(OracleError::RateLimited)));
    }

    #[tokio::test]
    async fn test_classify_no_candidates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "gemini-1.5-flash", "test-key");
        let result = backend.classify(request()).await;

        assert!(matches!(result, Err(OracleError::Parse(_))));
    }

    #[tokio::test]
    async fn test_classify_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "gemini-1.5-flash", "test-key");
        let result = backend.classify(request()).await;

        assert!(matches!(
            result,
            Err(OracleError::RequestFailed { status: 500, .. })
        ));
    }
}
