//! Eco Agent - AI Verification and Scoring Engine
//!
//! Provides the verification half of EcoRewards:
//! - Trait-based vision backends (Gemini generateContent, mock)
//! - Strict verdict parsing with fence stripping
//! - Pure point/rank scoring over roster entries
//! - Submission orchestration with an audit trail
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          EcoRewardsService              │
//! │   (Main entry point for submissions)    │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │VisionBackend│       │ RosterStore │
//! │ (Gemini/    │       │ (roster     │
//! │  Mock)      │       │  crate)     │
//! └─────────────┘       └─────────────┘
//! ```

pub mod audit;
pub mod backend;
pub mod config;
pub mod scoring;
pub mod service;
pub mod verdict;

// Re-export main types for convenience
pub use audit::{SubmissionEntry, SubmissionLog, SubmissionStats, SubmissionStatus};
pub use backend::{ClassifyRequest, ClassifyResponse, ImageData, OracleError, VisionBackend};
pub use config::EcoConfig;
pub use scoring::apply_verdict;
pub use service::{
    EcoRewardsService, ServiceConfig, ServiceError, SubmissionOutcome, SubmissionRequest,
};
pub use verdict::{VerificationVerdict, VERIFICATION_INSTRUCTION};
