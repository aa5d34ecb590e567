// Failure taxonomy for a single follow-up attempt.
//
// Every stage's failure is folded into one of these and counted against the
// job's attempt budget. The variants stay distinct even though the default
// policy retries all of them, so the policy can treat them differently and
// tests can tell them apart.

use thiserror::Error;

use crate::transcode::TranscodeError;

/// Why the media isn't obtainable yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The catalog query failed outright.
    CatalogUnavailable,
    /// The catalog has no usable rows for this game yet.
    NoCandidates,
    /// Rows exist, but none pass the inning/batter filter.
    NoMatch,
    /// A row matched, but its media URL doesn't answer yet.
    MediaUnpublished,
}

impl Unavailable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unavailable::CatalogUnavailable => "catalog_unavailable",
            Unavailable::NoCandidates => "no_candidates",
            Unavailable::NoMatch => "no_match",
            Unavailable::MediaUnpublished => "media_unpublished",
        }
    }
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed follow-up attempt.
#[derive(Debug, Error)]
pub enum FollowUpError {
    #[error("not yet available: {0}")]
    NotYetAvailable(Unavailable),

    #[error("transcode tool failed: {0}")]
    ToolFailure(String),

    #[error("artifact too large: {bytes} bytes (limit {limit})")]
    OversizeArtifact { bytes: u64, limit: u64 },

    #[error("publish failed: {0}")]
    PublishFailure(String),
}

impl FollowUpError {
    /// Short label for logs and cycle reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FollowUpError::NotYetAvailable(_) => "not_yet_available",
            FollowUpError::ToolFailure(_) => "tool_failure",
            FollowUpError::OversizeArtifact { .. } => "oversize_artifact",
            FollowUpError::PublishFailure(_) => "publish_failure",
        }
    }
}

impl From<TranscodeError> for FollowUpError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::Oversize { bytes, limit } => {
                FollowUpError::OversizeArtifact { bytes, limit }
            }
            other => FollowUpError::ToolFailure(other.to_string()),
        }
    }
}
