//! Tabular store abstraction layer.
//!
//! Provides a trait-based interface over the remote spreadsheet connector:
//! - JSON-over-HTTP backend (Apps Script web apps, sheet API bridges)
//! - Mock store for testing

pub mod mock;
pub mod sheets;
pub mod traits;

pub use mock::MockStore;
pub use sheets::SheetsStore;
pub use traits::{StoreError, StoreRow, TabularStore};
