// MemoryStore — ProcessedStore kept entirely in memory.
//
// Used when the binary runs without the sqlite feature and by tests that
// don't care about persistence. Everything is lost on exit.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::traits::ProcessedStore;
use crate::play::models::AtBatKey;

#[derive(Default)]
pub struct MemoryStore {
    processed: Mutex<HashMap<AtBatKey, DateTime<Utc>>>,
    state: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedStore for MemoryStore {
    async fn table_count(&self) -> Result<i64> {
        Ok(0)
    }

    async fn load_processed(&self) -> Result<Vec<(AtBatKey, DateTime<Utc>)>> {
        let processed = self.processed.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = processed.iter().map(|(k, at)| (k.clone(), *at)).collect();
        entries.sort_by_key(|(_, at)| *at);
        Ok(entries)
    }

    async fn insert_processed(&self, key: &AtBatKey, at: DateTime<Utc>) -> Result<bool> {
        let mut processed = self.processed.lock().unwrap_or_else(|e| e.into_inner());
        if processed.contains_key(key) {
            return Ok(false);
        }
        processed.insert(key.clone(), at);
        Ok(true)
    }

    async fn prune_processed(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut processed = self.processed.lock().unwrap_or_else(|e| e.into_inner());
        let before = processed.len();
        processed.retain(|_, at| *at >= cutoff);
        Ok(before - processed.len())
    }

    async fn processed_count(&self) -> Result<i64> {
        let processed = self.processed.lock().unwrap_or_else(|e| e.into_inner());
        Ok(processed.len() as i64)
    }

    async fn get_state(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.get(key).cloned())
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
