// Processed set — at-bats whose primary post has already gone out.
//
// Lookups hit an in-memory map; every insert is written through to the
// store so a restart doesn't re-announce a play. Entries older than the
// retention window are swept periodically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::db::{self, ProcessedStore};
use crate::play::models::AtBatKey;

const LAST_SWEEP_KEY: &str = "last_sweep";

pub struct ProcessedSet {
    seen: Mutex<HashMap<AtBatKey, DateTime<Utc>>>,
    store: Arc<dyn ProcessedStore>,
}

impl ProcessedSet {
    /// Load every remembered at-bat from the store.
    pub async fn load(store: Arc<dyn ProcessedStore>) -> Result<Self> {
        let entries = store.load_processed().await?;
        debug!(count = entries.len(), "Loaded processed at-bats");
        Ok(Self {
            seen: Mutex::new(entries.into_iter().collect()),
            store,
        })
    }

    pub fn contains(&self, key: &AtBatKey) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    /// Remember an at-bat. Returns false if it was already known.
    ///
    /// If the store write fails the key is forgotten again, so a retry is
    /// treated as a new at-bat rather than a duplicate.
    pub async fn insert(&self, key: &AtBatKey, at: DateTime<Utc>) -> Result<bool> {
        {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            if seen.contains_key(key) {
                return Ok(false);
            }
            seen.insert(key.clone(), at);
        }
        if let Err(e) = self.store.insert_processed(key, at).await {
            self.seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(key);
            return Err(e);
        }
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget at-bats processed more than `retention` before `now`.
    pub async fn sweep(&self, now: DateTime<Utc>, retention: Duration) -> Result<usize> {
        let cutoff = now - retention;
        {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            seen.retain(|_, at| *at >= cutoff);
        }
        let removed = self.store.prune_processed(cutoff).await?;
        self.store
            .set_state(LAST_SWEEP_KEY, &db::format_timestamp(now))
            .await?;
        if removed > 0 {
            info!(removed, "Swept old processed at-bats");
        }
        Ok(removed)
    }

    /// When the last sweep ran, if ever.
    pub async fn last_sweep(&self) -> Result<Option<DateTime<Utc>>> {
        last_sweep(self.store.as_ref()).await
    }
}

/// Read the last sweep time straight from a store.
pub async fn last_sweep(store: &dyn ProcessedStore) -> Result<Option<DateTime<Utc>>> {
    match store.get_state(LAST_SWEEP_KEY).await? {
        Some(text) => Ok(Some(db::parse_timestamp(&text)?)),
        None => Ok(None),
    }
}
