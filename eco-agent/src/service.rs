//! EcoRewardsService - main entry point for photo submissions.
//!
//! This service orchestrates the full submission flow: register the student
//! on the roster, ask a vision backend for a verdict, credit points on a
//! positive verdict, and persist the roster back to the store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use roster::{Roster, RosterEntry, RosterStore, SheetsStore, StoreError};

use crate::audit::{SubmissionEntry, SubmissionLog, SubmissionStats, SubmissionStatus};
use crate::backend::{ClassifyRequest, GeminiBackend, ImageData, OracleError, VisionBackend};
use crate::config::EcoConfig;
use crate::scoring::apply_verdict;
use crate::verdict::{VerificationVerdict, VERIFICATION_INSTRUCTION};

/// Error types for the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request validation error
    #[error("Invalid submission: {0}")]
    InvalidRequest(String),

    /// No backend available
    #[error("No vision backend available")]
    NoBackendAvailable,

    /// Vision backend or verdict error
    #[error("Verification error: {0}")]
    Oracle(#[from] OracleError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration for the EcoRewardsService.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service instance ID
    pub service_id: String,
    /// Whether to log all submissions
    pub audit_enabled: bool,
    /// Leaderboard size returned to callers
    pub leaderboard_size: usize,
    /// Max tokens the verdict reply may use
    pub max_output_tokens: u32,
    /// Sampling temperature for the vision backend
    pub temperature: Option<f32>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_id: uuid::Uuid::new_v4().to_string(),
            audit_enabled: true,
            leaderboard_size: 10,
            max_output_tokens: 512,
            temperature: None,
        }
    }
}

/// A student's photo submission.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Student identifier
    pub student_id: String,
    /// Student display name
    pub name: String,
    /// Photo of the recycling action
    pub image: ImageData,
}

impl SubmissionRequest {
    /// Create a submission.
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        image: ImageData,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            image,
        }
    }
}

/// Outcome of a processed submission.
///
/// A negative verdict is a normal outcome, not an error: the student is told
/// the model's reason and may simply try again.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Verdict was positive; points credited and persisted
    Verified {
        /// The updated roster entry
        entry: RosterEntry,
        /// Points credited by this submission
        awarded: u64,
        /// The model's stated reason
        reason: String,
    },
    /// Verdict was negative; nothing changed
    Rejected {
        /// The untouched roster entry
        entry: RosterEntry,
        /// The model's stated reason
        reason: String,
    },
}

/// Main entry point for EcoRewards submissions.
pub struct EcoRewardsService {
    /// Configuration
    config: ServiceConfig,
    /// Available vision backends (first available wins)
    backends: Vec<Arc<dyn VisionBackend>>,
    /// Roster persistence
    roster: RosterStore,
    /// Submission audit trail
    audit: SubmissionLog,
}

impl EcoRewardsService {
    /// Create a new service with the given backends and roster store.
    pub fn new(backends: Vec<Arc<dyn VisionBackend>>, roster: RosterStore) -> Self {
        Self {
            config: ServiceConfig::default(),
            backends,
            roster,
            audit: SubmissionLog::new(),
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a production service from configuration: a Gemini backend and
    /// an HTTP spreadsheet store, both with the configured timeouts.
    pub fn from_config(config: &EcoConfig) -> Self {
        let backend = GeminiBackend::with_timeout(
            config.vision.base_url.as_str(),
            config.vision.model.as_str(),
            config.vision.api_key.as_str(),
            Duration::from_millis(config.vision.timeout_ms),
        );

        let store = SheetsStore::with_timeout(
            config.store.base_url.as_str(),
            config.store.api_key.clone(),
            Duration::from_millis(config.store.timeout_ms),
        );
        let roster = RosterStore::new(Arc::new(store)).with_table(config.store.table.as_str());

        let mut service_config: ServiceConfig = config.service.clone().into();
        service_config.temperature = config.vision.temperature;

        Self::new(vec![Arc::new(backend)], roster).with_config(service_config)
    }

    /// Get the service ID.
    pub fn service_id(&self) -> &str {
        &self.config.service_id
    }

    /// Process a photo submission end to end.
    ///
    /// Flow: validate -> load roster (fail-open) -> find-or-create the
    /// student's row -> classify the photo -> parse the verdict -> on a
    /// positive verdict, credit points and persist the whole roster.
    ///
    /// A persist failure after a positive verdict loses the in-memory
    /// update; the next fetch will not reflect it. That no-partial-
    /// application behavior is deliberate and surfaced as the error.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, ServiceError> {
        if request.student_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "student_id must not be empty".to_string(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "name must not be empty".to_string(),
            ));
        }

        let entry_id = if self.config.audit_enabled {
            Some(self.audit.log_submission(&request.student_id).await)
        } else {
            None
        };

        debug!(
            service_id = %self.config.service_id,
            student_id = %request.student_id,
            "Processing submission"
        );

        match self.process(&request).await {
            Ok((outcome, backend_id)) => {
                if let Some(entry_id) = &entry_id {
                    let (status, awarded, detail) = match &outcome {
                        SubmissionOutcome::Verified {
                            awarded, reason, ..
                        } => (SubmissionStatus::Verified, Some(*awarded), reason.clone()),
                        SubmissionOutcome::Rejected { reason, .. } => {
                            (SubmissionStatus::Rejected, None, reason.clone())
                        }
                    };
                    self.audit
                        .log_outcome(entry_id, Some(&backend_id), status, awarded, detail)
                        .await;
                }
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    student_id = %request.student_id,
                    error = %err,
                    "Submission failed"
                );
                if let Some(entry_id) = &entry_id {
                    self.audit
                        .log_outcome(
                            entry_id,
                            None,
                            SubmissionStatus::Failed,
                            None,
                            err.to_string(),
                        )
                        .await;
                }
                Err(err)
            }
        }
    }

    /// Current leaderboard, top entries by points descending.
    pub async fn leaderboard(&self) -> Vec<RosterEntry> {
        let roster = self.roster.fetch().await;
        roster.leaderboard(self.config.leaderboard_size)
    }

    /// Look up a student's current entry.
    pub async fn student(&self, student_id: &str) -> Option<RosterEntry> {
        let roster = self.roster.fetch().await;
        roster.get(student_id).cloned()
    }

    /// Get recent audit entries.
    pub async fn audit_log(&self, limit: usize) -> Vec<SubmissionEntry> {
        self.audit.recent(limit).await
    }

    /// Get submission statistics.
    pub async fn audit_stats(&self) -> SubmissionStats {
        self.audit.stats().await
    }

    /// Select the first available backend.
    async fn select_backend(&self) -> Result<Arc<dyn VisionBackend>, ServiceError> {
        for backend in &self.backends {
            if backend.is_available().await {
                return Ok(Arc::clone(backend));
            }
        }
        Err(ServiceError::NoBackendAvailable)
    }

    async fn process(
        &self,
        request: &SubmissionRequest,
    ) -> Result<(SubmissionOutcome, String), ServiceError> {
        let mut roster: Roster = self.roster.fetch().await;
        let entry = self
            .roster
            .ensure_entry(&mut roster, &request.student_id, &request.name)
            .await?;

        let backend = self.select_backend().await?;
        let backend_id = backend.id().to_string();

        let mut classify = ClassifyRequest::new(VERIFICATION_INSTRUCTION, request.image.clone())
            .with_max_output_tokens(self.config.max_output_tokens);
        if let Some(temperature) = self.config.temperature {
            classify = classify.with_temperature(temperature);
        }

        let reply = backend.classify(classify).await?;
        let verdict = VerificationVerdict::parse(&reply.text)?;

        if !verdict.is_valid {
            info!(
                student_id = %request.student_id,
                reason = %verdict.reason,
                "Submission rejected"
            );
            return Ok((
                SubmissionOutcome::Rejected {
                    entry,
                    reason: verdict.reason,
                },
                backend_id,
            ));
        }

        let awarded = verdict.awarded_points();
        let updated = apply_verdict(&entry, &verdict);
        roster.upsert(updated.clone());
        self.roster.persist(&roster).await?;

        info!(
            student_id = %request.student_id,
            awarded,
            points = updated.points,
            rank = %updated.rank,
            "Submission verified"
        );

        Ok((
            SubmissionOutcome::Verified {
                entry: updated,
                awarded,
                reason: verdict.reason,
            },
            backend_id,
        ))
    }
}
