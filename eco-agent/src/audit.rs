//! Audit trail for photo submissions.
//!
//! Provides transparency by logging every submission and its outcome.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maximum entries in the submission log before pruning.
const MAX_LOG_ENTRIES: usize = 10_000;

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Positive verdict, points credited and persisted
    Verified,
    /// Negative verdict, nothing changed
    Rejected,
    /// Backend, parse, or store failure
    Failed,
}

/// An entry in the submission log.
#[derive(Debug, Clone)]
pub struct SubmissionEntry {
    /// Unique entry ID
    pub entry_id: String,
    /// Student who submitted
    pub student_id: String,
    /// Vision backend that handled the photo
    pub backend_id: Option<String>,
    /// Outcome, once known
    pub status: Option<SubmissionStatus>,
    /// Points credited on a positive verdict
    pub awarded: Option<u64>,
    /// The verdict's stated reason, or the failure message
    pub detail: Option<String>,
    /// When the submission arrived
    pub requested_at: DateTime<Utc>,
    /// When the outcome was recorded
    pub responded_at: Option<DateTime<Utc>>,
    /// Processing duration in ms
    pub duration_ms: Option<u64>,
}

impl SubmissionEntry {
    /// Create an entry for an incoming submission.
    pub fn for_student(student_id: impl Into<String>) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            student_id: student_id.into(),
            backend_id: None,
            status: None,
            awarded: None,
            detail: None,
            requested_at: Utc::now(),
            responded_at: None,
            duration_ms: None,
        }
    }
}

/// Bounded in-memory log of submissions (newest first).
pub struct SubmissionLog {
    entries: Arc<RwLock<VecDeque<SubmissionEntry>>>,
    max_entries: usize,
}

impl SubmissionLog {
    /// Create a new submission log.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries: MAX_LOG_ENTRIES,
        }
    }

    /// Create with custom max entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    /// Log an incoming submission (before processing).
    pub async fn log_submission(&self, student_id: &str) -> String {
        let entry = SubmissionEntry::for_student(student_id);
        let entry_id = entry.entry_id.clone();

        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        // Prune if over limit
        while entries.len() > self.max_entries {
            entries.pop_back();
        }

        entry_id
    }

    /// Record a submission's outcome.
    pub async fn log_outcome(
        &self,
        entry_id: &str,
        backend_id: Option<&str>,
        status: SubmissionStatus,
        awarded: Option<u64>,
        detail: impl Into<String>,
    ) {
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.iter_mut().find(|e| e.entry_id == entry_id) {
            let responded_at = Utc::now();
            entry.backend_id = backend_id.map(String::from);
            entry.status = Some(status);
            entry.awarded = awarded;
            entry.detail = Some(detail.into());
            entry.responded_at = Some(responded_at);
            entry.duration_ms = Some(
                (responded_at - entry.requested_at)
                    .num_milliseconds()
                    .max(0) as u64,
            );
        }
    }

    /// Get recent entries.
    pub async fn recent(&self, limit: usize) -> Vec<SubmissionEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Get entries for a student.
    pub async fn for_student(&self, student_id: &str, limit: usize) -> Vec<SubmissionEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.student_id == student_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Get statistics.
    pub async fn stats(&self) -> SubmissionStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let verified = entries
            .iter()
            .filter(|e| e.status == Some(SubmissionStatus::Verified))
            .count();
        let rejected = entries
            .iter()
            .filter(|e| e.status == Some(SubmissionStatus::Rejected))
            .count();
        let failed = entries
            .iter()
            .filter(|e| e.status == Some(SubmissionStatus::Failed))
            .count();

        let avg_duration_ms = if total > 0 {
            entries.iter().filter_map(|e| e.duration_ms).sum::<u64>() / total as u64
        } else {
            0
        };

        let points_awarded = entries.iter().filter_map(|e| e.awarded).sum();

        SubmissionStats {
            total,
            verified,
            rejected,
            failed,
            points_awarded,
            avg_duration_ms,
        }
    }

    /// Clear the log.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}

impl Default for SubmissionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from the submission log.
#[derive(Debug, Clone)]
pub struct SubmissionStats {
    /// Total submissions logged
    pub total: usize,
    /// Verified submissions
    pub verified: usize,
    /// Rejected submissions
    pub rejected: usize,
    /// Failed submissions
    pub failed: usize,
    /// Total points credited across verified submissions
    pub points_awarded: u64,
    /// Average processing duration
    pub avg_duration_ms: u64,
}
