//! Roster - Student Point and Rank Records
//!
//! Provides the data model and persistence layer for the EcoRewards roster:
//! - Rank tiers derived from point totals
//! - Insertion-ordered roster with find-or-create semantics
//! - Trait-based tabular store backends (HTTP spreadsheet, mock)
//! - Fail-open roster loading over a whole-table persistence model
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             RosterStore                 │
//! │  (fetch / ensure_entry / persist)       │
//! └────────────────┬────────────────────────┘
//!                  │
//!       ┌──────────┴──────────┐
//!       ▼                     ▼
//! ┌─────────────┐      ┌─────────────┐
//! │ TabularStore│      │   Roster    │
//! │ (Sheets/    │      │ (entries +  │
//! │  Mock)      │      │  rank tiers)│
//! └─────────────┘      └─────────────┘
//! ```

pub mod adapter;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use adapter::{RosterStore, DEFAULT_TABLE};
pub use store::{MockStore, SheetsStore, StoreError, StoreRow, TabularStore};
pub use types::{RankTier, Roster, RosterEntry, UnknownRankLabel};
