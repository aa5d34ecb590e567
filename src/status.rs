// Status display — database size, processed at-bats, last sweep.

use anyhow::Result;
use std::sync::Arc;

use crate::db::ProcessedStore;
use crate::followup::JobSummary;

/// Display store status to the terminal. The database must already exist.
pub async fn show(store: &Arc<dyn ProcessedStore>, db_display_path: &str) -> Result<()> {
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let processed = store.processed_count().await?;
    println!("Processed at-bats: {}", processed);

    match crate::processed::last_sweep(store.as_ref()).await? {
        Some(at) => println!("Last sweep: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last sweep: never"),
    }

    Ok(())
}

/// Print outstanding follow-up jobs, one per line.
pub fn show_jobs(jobs: &[JobSummary]) {
    if jobs.is_empty() {
        println!("Follow-ups: none outstanding");
        return;
    }
    println!("Follow-ups: {} outstanding", jobs.len());
    for job in jobs {
        println!(
            "  {} → {} [{}] attempts={} next={}",
            job.key,
            job.post,
            job.state,
            job.attempts,
            job.next_eligible_at.format("%H:%M:%S")
        );
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
