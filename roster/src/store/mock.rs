//! Mock tabular store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::*;

/// Mock store for testing.
///
/// Holds tables in memory with configurable read/write failure toggles and
/// call counters for unit tests.
pub struct MockStore {
    store_id: String,
    tables: RwLock<HashMap<String, Vec<StoreRow>>>,
    available: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_count: AtomicU32,
    write_count: AtomicU32,
}

impl MockStore {
    /// Create a new empty mock store.
    pub fn new(store_id: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            tables: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            read_count: AtomicU32::new(0),
            write_count: AtomicU32::new(0),
        }
    }

    /// Seed a table with rows.
    pub async fn with_table(self, table: impl Into<String>, rows: Vec<StoreRow>) -> Self {
        self.tables.write().await.insert(table.into(), rows);
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Make all reads fail.
    pub fn with_failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Make all writes fail.
    pub fn with_failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle read failures after construction.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Toggle write failures after construction.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Get the number of reads performed.
    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Get the number of writes performed.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Snapshot a table's current rows.
    pub async fn table(&self, table: &str) -> Vec<StoreRow> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new("mock-store")
    }
}

#[async_trait]
impl TabularStore for MockStore {
    fn id(&self) -> &str {
        &self.store_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn read(&self, table: &str) -> Result<Vec<StoreRow>, StoreError> {
        self.read_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Mock reads disabled".to_string()));
        }

        Ok(self.table(table).await)
    }

    async fn write(&self, table: &str, rows: &[StoreRow]) -> Result<(), StoreError> {
        self.write_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteRejected(
                "Mock writes disabled".to_string(),
            ));
        }

        self.tables
            .write()
            .await
            .insert(table.to_string(), rows.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, points: u64) -> StoreRow {
        StoreRow {
            student_id: id.to_string(),
            name: id.to_string(),
            points,
            rank: "Beginner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_round_trip() {
        let store = MockStore::default();

        store.write("Students", &[row("STU001", 0)]).await.unwrap();
        let rows = store.read("Students").await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_failing_reads() {
        let store = MockStore::default().with_failing_reads();

        let result = store.read("Students").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_failing_writes() {
        let store = MockStore::default().with_failing_writes();

        let result = store.write("Students", &[row("STU001", 0)]).await;
        assert!(matches!(result, Err(StoreError::WriteRejected(_))));
    }
}
