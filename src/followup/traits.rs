// Collaborator traits — the seams between the scheduler and the outside world.
//
// The scheduler drives catalog → match → resolve → transcode → publish per
// job, but only through these traits. Production wiring uses the Savant
// client, the ffmpeg transcoder and a publisher; tests swap in fakes.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::play::models::PostRef;
use crate::savant::models::CandidateAsset;
use crate::transcode::TranscodeError;

/// Source of catalog rows for one game. Queried fresh on every attempt.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn candidates(&self, game_pk: u64, game_date: NaiveDate) -> Result<Vec<CandidateAsset>>;
}

/// Resolves a matched candidate to a retrievable media URL.
///
/// `None` means "not available yet", never an error.
#[async_trait]
pub trait AnimationResolver: Send + Sync {
    async fn resolve(&self, candidate: &CandidateAsset) -> Option<String>;
}

/// Turns a media URL into a size-bounded animation on local disk.
#[async_trait]
pub trait ClipTranscoder: Send + Sync {
    async fn transcode(
        &self,
        url: &str,
        max_duration_secs: u32,
        max_bytes: u64,
    ) -> Result<PathBuf, TranscodeError>;
}

/// Posts the animation as a follow-up to the primary post.
///
/// `Ok(false)` and `Err(_)` are both treated as a failed attempt.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, artifact: &Path, post: &PostRef) -> Result<bool>;
}
