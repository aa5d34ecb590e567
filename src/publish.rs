// Publishers for the follow-up post.
//
// Posting to a real social network is wired in by whoever embeds the
// scheduler. The dry-run publisher stands in for local runs: it checks the
// artifact is there and logs what would have been posted.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::followup::traits::Publisher;
use crate::play::models::PostRef;

/// Logs the follow-up instead of posting it. Always succeeds when the
/// artifact exists.
#[derive(Debug, Default, Clone)]
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, artifact: &Path, post: &PostRef) -> Result<bool> {
        let meta = tokio::fs::metadata(artifact)
            .await
            .with_context(|| format!("Artifact missing: {}", artifact.display()))?;
        info!(
            post = %post,
            artifact = %artifact.display(),
            bytes = meta.len(),
            "Dry run: would post follow-up"
        );
        Ok(true)
    }
}
