// Storage trait — backend-agnostic async interface for the processed set.
//
// Implementors: SqliteStore (wraps rusqlite) and MemoryStore (for runs
// without a database file, and for tests). The scheduler and the CLI only
// ever hold an `Arc<dyn ProcessedStore>`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::play::models::AtBatKey;

#[async_trait]
pub trait ProcessedStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables (0 for non-SQL backends).
    async fn table_count(&self) -> Result<i64>;

    // --- Processed at-bats ---

    /// Every remembered at-bat with the time it was processed.
    async fn load_processed(&self) -> Result<Vec<(AtBatKey, DateTime<Utc>)>>;

    /// Remember an at-bat. Returns false if it was already present.
    async fn insert_processed(&self, key: &AtBatKey, at: DateTime<Utc>) -> Result<bool>;

    /// Forget at-bats processed before `cutoff`. Returns how many were removed.
    async fn prune_processed(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    async fn processed_count(&self) -> Result<i64>;

    // --- Store state ---

    /// Get a state value by key (e.g., "last_sweep").
    async fn get_state(&self, key: &str) -> Result<Option<String>>;

    /// Set a state value (upsert).
    async fn set_state(&self, key: &str, value: &str) -> Result<()>;
}
