// Storage layer — the persisted set of already-processed at-bats.
//
// SQLite via rusqlite with the "bundled" feature, so there's no system
// SQLite dependency. The database file lives wherever PLAYCLIP_DB_PATH
// points (defaults to ./playclip.db). Builds without the sqlite feature
// fall back to MemoryStore.

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

pub use memory::MemoryStore;
pub use traits::ProcessedStore;

/// Canonical text form for stored timestamps. Fixed width, so comparing the
/// strings compares the instants.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("Bad stored timestamp: {text}"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Open (or create) the database and run migrations.
///
/// Called by `playclip init` and by any command that needs the store.
#[cfg(feature = "sqlite")]
pub fn initialize(db_path: &str) -> Result<Arc<dyn ProcessedStore>> {
    use std::path::Path;

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    // WAL so `playclip status` can read while the scheduler writes
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(Arc::new(sqlite::SqliteStore::new(conn)))
}

/// Open an existing database (fails if it doesn't exist yet).
#[cfg(feature = "sqlite")]
pub fn open(db_path: &str) -> Result<Arc<dyn ProcessedStore>> {
    use std::path::Path;

    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `playclip init` first.",
            db_path
        );
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Older files may predate the latest migration.
    schema::create_tables(&conn)?;

    Ok(Arc::new(sqlite::SqliteStore::new(conn)))
}

#[cfg(not(feature = "sqlite"))]
pub fn initialize(_db_path: &str) -> Result<Arc<dyn ProcessedStore>> {
    tracing::warn!("Built without sqlite; processed at-bats will not survive a restart");
    Ok(Arc::new(MemoryStore::new()))
}

#[cfg(not(feature = "sqlite"))]
pub fn open(db_path: &str) -> Result<Arc<dyn ProcessedStore>> {
    initialize(db_path)
}
