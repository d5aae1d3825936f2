//! Vision backend abstraction layer.
//!
//! Provides a clean trait-based interface for multimodal classification:
//! - Gemini generateContent API (and compatible gateways)
//! - Mock backend for testing

pub mod gemini;
pub mod mock;
pub mod traits;

pub use gemini::GeminiBackend;
pub use mock::MockVisionBackend;
pub use traits::{ClassifyRequest, ClassifyResponse, ImageData, OracleError, Usage, VisionBackend};
