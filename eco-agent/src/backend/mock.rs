//! Mock vision backend for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use super::traits::*;

/// Mock backend for testing.
///
/// Configurable reply text and behavior for unit tests.
pub struct MockVisionBackend {
    model_id: String,
    available: AtomicBool,
    reply_text: String,
    call_count: AtomicU32,
    last_instruction: Mutex<Option<String>>,
}

impl MockVisionBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            reply_text: "Mock reply".to_string(),
            call_count: AtomicU32::new(0),
            last_instruction: Mutex::new(None),
        }
    }

    /// Set the reply text.
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.reply_text = text.into();
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Get the number of times classify was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the instruction from the most recent classify call.
    pub fn last_instruction(&self) -> Option<String> {
        self.last_instruction.lock().unwrap().clone()
    }
}

impl Default for MockVisionBackend {
    fn default() -> Self {
        Self::new("mock-vision")
    }
}

#[async_trait]
impl VisionBackend for MockVisionBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, OracleError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_instruction.lock().unwrap() = Some(request.instruction.clone());

        if !self.available.load(Ordering::SeqCst) {
            return Err(OracleError::Unavailable("Mock backend disabled".to_string()));
        }

        // Estimate token counts
        let prompt_tokens =
            (request.instruction.len() / 4 + request.image.bytes.len() / 1024) as u32;
        let completion_tokens = self.reply_text.len() as u32 / 4;

        Ok(ClassifyResponse {
            text: self.reply_text.clone(),
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend() {
        let backend = MockVisionBackend::new("test-vision").with_reply("looks recycled");

        assert!(backend.is_available().await);
        assert_eq!(backend.call_count(), 0);

        let response = backend
            .classify(ClassifyRequest::new("check", ImageData::jpeg(vec![1])))
            .await
            .unwrap();

        assert_eq!(response.text, "looks recycled");
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.last_instruction().unwrap(), "check");
    }

    #[tokio::test]
    async fn test_mock_unavailable() {
        let backend = MockVisionBackend::default().with_available(false);

        assert!(!backend.is_available().await);

        let result = backend
            .classify(ClassifyRequest::new("check", ImageData::jpeg(vec![1])))
            .await;
        assert!(result.is_err());
    }
}
