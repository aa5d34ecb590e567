// Follow-up jobs — one per primary post awaiting its animation.
//
// Jobs live only in memory. A restart loses whatever was in flight.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::play::models::{AtBatKey, PlayRecord, PostRef};

/// Lifecycle state. `Succeeded`, `Abandoned` and `Expired` are terminal and
/// a job in one of them is removed from the queue immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Pending,
    InProgress,
    Succeeded,
    Abandoned,
    Expired,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Abandoned | JobState::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::InProgress => "in_progress",
            JobState::Succeeded => "succeeded",
            JobState::Abandoned => "abandoned",
            JobState::Expired => "expired",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FollowUpJob {
    pub key: AtBatKey,
    pub play: PlayRecord,
    pub post: PostRef,
    pub created_at: DateTime<Utc>,
    pub attempts: u32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub state: JobState,
}

impl FollowUpJob {
    /// A fresh job for a play whose primary post has just been published.
    pub fn new(play: PlayRecord, post: PostRef, created_at: DateTime<Utc>) -> Self {
        Self {
            key: play.at_bat_key(),
            play,
            post,
            created_at,
            attempts: 0,
            last_attempt: None,
            state: JobState::Pending,
        }
    }

    /// Record a failed attempt that started at `at`.
    pub fn record_failure(&mut self, at: DateTime<Utc>) {
        self.attempts += 1;
        self.last_attempt = Some(at);
        self.state = JobState::Pending;
    }
}

/// Read-only view of a job, for status output.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub key: AtBatKey,
    pub post: PostRef,
    pub state: JobState,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub next_eligible_at: DateTime<Utc>,
}
