// Database queries — every SQL statement the store runs lives here.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, parse_timestamp};
use crate::play::models::AtBatKey;

// --- Processed at-bats ---

pub fn load_processed(conn: &Connection) -> Result<Vec<(AtBatKey, DateTime<Utc>)>> {
    let mut stmt = conn.prepare("SELECT key, processed_at FROM processed_at_bats ORDER BY processed_at")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (key, at) = row?;
        entries.push((AtBatKey::from_stored(key), parse_timestamp(&at)?));
    }
    Ok(entries)
}

/// Insert unless present. Returns true if a row was added.
pub fn insert_processed(conn: &Connection, key: &AtBatKey, at: DateTime<Utc>) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO processed_at_bats (key, processed_at) VALUES (?1, ?2)",
        params![key.as_str(), format_timestamp(at)],
    )?;
    Ok(changed > 0)
}

pub fn prune_processed(conn: &Connection, cutoff: DateTime<Utc>) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM processed_at_bats WHERE processed_at < ?1",
        params![format_timestamp(cutoff)],
    )?;
    Ok(removed)
}

pub fn processed_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM processed_at_bats", [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

// --- Store state ---

pub fn get_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM store_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

pub fn set_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO store_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}
