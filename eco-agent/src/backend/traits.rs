//! Core traits for vision backends.
//!
//! This module defines the `VisionBackend` trait - the abstraction over the
//! external multimodal service that classifies a submitted photo.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error types for verification operations.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Backend is not available
    #[error("Vision backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Vision request failed: HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Rate limited by the backend
    #[error("Rate limited by vision backend")]
    RateLimited,

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Vision request timed out")]
    Timeout,

    /// Reply could not be parsed into the verdict shape
    #[error("Verdict parse error: {0}")]
    Parse(String),

    /// Verdict JSON parsed but violated the verdict contract
    #[error("Invalid verdict: {0}")]
    InvalidVerdict(String),
}

/// An image attached to a classification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
    /// Raw image bytes
    #[serde(with = "serde_bytes_base64")]
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Create image data from raw bytes.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// JPEG image from raw bytes.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new("image/jpeg", bytes)
    }

    /// PNG image from raw bytes.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self::new("image/png", bytes)
    }
}

/// Serialize image bytes as base64 so requests stay loggable as JSON.
mod serde_bytes_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Request for image classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    /// Instruction text sent alongside the image
    pub instruction: String,
    /// The image to classify
    pub image: ImageData,
    /// Maximum tokens to generate
    pub max_output_tokens: Option<u32>,
    /// Temperature (0.0-2.0)
    pub temperature: Option<f32>,
}

impl ClassifyRequest {
    /// Create a request from an instruction and an image.
    pub fn new(instruction: impl Into<String>, image: ImageData) -> Self {
        Self {
            instruction: instruction.into(),
            image,
            max_output_tokens: None,
            temperature: None,
        }
    }

    /// Set max output tokens.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp.clamp(0.0, 2.0));
        self
    }
}

/// Reply from image classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    /// Free-form reply text
    pub text: String,
    /// Token usage
    pub usage: Usage,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt (instruction + image)
    pub prompt_tokens: u32,
    /// Tokens in the reply
    pub completion_tokens: u32,
}

impl Usage {
    /// Get total tokens.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Core trait for vision backends.
///
/// Abstracts over multimodal inference services (Gemini, OpenAI-compatible
/// vision endpoints) behind a single instruction-plus-image call.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Get the backend identifier (e.g., model name).
    fn id(&self) -> &str;

    /// Check if the backend is currently available.
    async fn is_available(&self) -> bool;

    /// Classify an image against an instruction, returning the raw reply.
    async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, OracleError>;
}
