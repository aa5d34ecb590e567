// SqliteStore — rusqlite backend implementing ProcessedStore.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::traits::ProcessedStore;
use crate::play::models::AtBatKey;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl ProcessedStore for SqliteStore {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn load_processed(&self) -> Result<Vec<(AtBatKey, DateTime<Utc>)>> {
        let conn = self.conn.lock().await;
        super::queries::load_processed(&conn)
    }

    async fn insert_processed(&self, key: &AtBatKey, at: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::insert_processed(&conn, key, at)
    }

    async fn prune_processed(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn.lock().await;
        super::queries::prune_processed(&conn, cutoff)
    }

    async fn processed_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::processed_count(&conn)
    }

    async fn get_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_state(&conn, key)
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_state(&conn, key, value)
    }
}
