//! Core trait for tabular store backends.
//!
//! This module defines the `TabularStore` trait - the abstraction over the
//! remote spreadsheet holding the roster. A backend only needs to read and
//! write whole tables of rows; find-or-create semantics live in the
//! [`RosterStore`](crate::adapter::RosterStore) adapter above it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error types for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend is not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Request was rejected by the backend
    #[error("Store request failed: HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Store request timed out")]
    Timeout,

    /// Read payload could not be parsed as rows
    #[error("Malformed table payload: {0}")]
    Malformed(String),

    /// Write was rejected
    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

impl StoreError {
    /// Whether this error came from a read-side failure that the adapter's
    /// fail-open policy absorbs.
    pub fn is_read_failure(&self) -> bool {
        !matches!(self, Self::WriteRejected(_))
    }
}

/// One row of the roster table, in the store's column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRow {
    /// `StudentID` column
    #[serde(rename = "StudentID")]
    pub student_id: String,
    /// `Name` column
    #[serde(rename = "Name")]
    pub name: String,
    /// `Points` column
    #[serde(rename = "Points")]
    pub points: u64,
    /// `Rank` column, display label
    #[serde(rename = "Rank")]
    pub rank: String,
}

/// Core trait for tabular store backends.
///
/// Abstracts over the remote spreadsheet connector. Both operations act on a
/// whole named table: `write` replaces the table's prior contents entirely.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Get the backend identifier (e.g., endpoint name).
    fn id(&self) -> &str;

    /// Check if the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Read all rows of a table.
    async fn read(&self, table: &str) -> Result<Vec<StoreRow>, StoreError>;

    /// Replace a table's contents with the given rows.
    async fn write(&self, table: &str, rows: &[StoreRow]) -> Result<(), StoreError>;
}
