// Detection intake — the only part of the follow-up core the detection
// loop touches.
//
// `observe` decides whether a freshly polled play is new; `follow_up`
// queues the clip job once the primary post is out. Neither waits on the
// worker: the job queue lock is held only for a push.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::job::FollowUpJob;
use super::queue::FollowUpQueue;
use crate::play::models::{PlayRecord, PostRef};
use crate::processed::ProcessedSet;

#[derive(Clone)]
pub struct Intake {
    processed: Arc<ProcessedSet>,
    queue: FollowUpQueue,
}

impl Intake {
    pub fn new(processed: Arc<ProcessedSet>, queue: FollowUpQueue) -> Self {
        Self { processed, queue }
    }

    /// Record a detected play. Returns true the first time an at-bat is
    /// seen, false for every repeat (including across restarts).
    pub async fn observe(&self, play: &PlayRecord, now: DateTime<Utc>) -> Result<bool> {
        let key = play.at_bat_key();
        let fresh = self.processed.insert(&key, now).await?;
        if !fresh {
            debug!(key = %key, "Already processed, skipping");
        }
        Ok(fresh)
    }

    /// Queue a follow-up for a play whose primary post just succeeded.
    /// Returns false if one is already outstanding for the at-bat.
    pub fn follow_up(&self, play: PlayRecord, post: PostRef, now: DateTime<Utc>) -> bool {
        self.queue.enqueue(FollowUpJob::new(play, post, now))
    }

    pub fn queue(&self) -> &FollowUpQueue {
        &self.queue
    }
}
