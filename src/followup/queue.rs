// Follow-up queue — the job collection shared by detection and the worker.
//
// The detection path only ever calls `enqueue`; the worker calls `scan`,
// `complete`, `fail` and `remove`. Every method takes the lock once, does
// a bounded amount of in-memory work, and releases it. Nothing awaits
// while holding it, so enqueue never waits on a transcode.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::job::{FollowUpJob, JobState, JobSummary};
use super::policy::{Eligibility, RetryPolicy};
use crate::play::models::AtBatKey;

/// Result of one eligibility scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Jobs marked InProgress, in insertion order. These are snapshots; the queue
    /// still owns the jobs until `complete`/`fail`/`remove` is called.
    pub ready: Vec<FollowUpJob>,
    /// Jobs removed because they exceeded the age limit.
    pub expired: Vec<AtBatKey>,
    /// Jobs removed because they ran out of attempts.
    pub abandoned: Vec<AtBatKey>,
}

/// Concurrency-safe, insertion-ordered collection of follow-up jobs with at
/// most one job per at-bat.
#[derive(Clone, Default)]
pub struct FollowUpQueue {
    jobs: Arc<Mutex<Vec<FollowUpJob>>>,
}

impl FollowUpQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere while holding the lock leaves the Vec itself intact,
    // so keep going with whatever is in it.
    fn lock(&self) -> MutexGuard<'_, Vec<FollowUpJob>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a job. Returns false (and drops the job) if one for the same
    /// at-bat is already outstanding.
    pub fn enqueue(&self, job: FollowUpJob) -> bool {
        let mut jobs = self.lock();
        if jobs.iter().any(|j| j.key == job.key) {
            debug!(job = %job.key, "Follow-up already queued, skipping");
            return false;
        }
        info!(job = %job.key, post = %job.post, "Queued follow-up");
        jobs.push(job);
        true
    }

    /// Apply the policy to every pending job.
    ///
    /// Expired and abandoned jobs are removed. Ready jobs are marked
    /// InProgress and returned as snapshots for the worker to attempt.
    pub fn scan(&self, policy: &RetryPolicy, now: DateTime<Utc>) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let mut jobs = self.lock();

        jobs.retain_mut(|job| {
            if job.state != JobState::Pending {
                return true;
            }
            match policy.evaluate(job, now) {
                Eligibility::Expire => {
                    job.state = JobState::Expired;
                    warn!(
                        job = %job.key,
                        attempts = job.attempts,
                        "Giving up on follow-up: too old"
                    );
                    outcome.expired.push(job.key.clone());
                }
                Eligibility::Abandon => {
                    job.state = JobState::Abandoned;
                    warn!(
                        job = %job.key,
                        attempts = job.attempts,
                        "Giving up on follow-up: out of attempts"
                    );
                    outcome.abandoned.push(job.key.clone());
                }
                Eligibility::Wait(_) => {}
                Eligibility::Ready => {
                    job.state = JobState::InProgress;
                    outcome.ready.push(job.clone());
                }
            }
            !job.state.is_terminal()
        });

        outcome
    }

    /// Mark a job succeeded and remove it.
    pub fn complete(&self, key: &AtBatKey) -> bool {
        self.remove(key).is_some()
    }

    /// Count a failed attempt that started at `attempted_at` and return the
    /// job to Pending. Returns the new attempt count, or None if the job is gone.
    pub fn fail(&self, key: &AtBatKey, attempted_at: DateTime<Utc>) -> Option<u32> {
        let mut jobs = self.lock();
        let job = jobs.iter_mut().find(|j| &j.key == key)?;
        job.record_failure(attempted_at);
        Some(job.attempts)
    }

    /// Remove a job regardless of state.
    pub fn remove(&self, key: &AtBatKey) -> Option<FollowUpJob> {
        let mut jobs = self.lock();
        let index = jobs.iter().position(|j| &j.key == key)?;
        Some(jobs.remove(index))
    }

    pub fn contains(&self, key: &AtBatKey) -> bool {
        self.lock().iter().any(|j| &j.key == key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cloned summaries of every outstanding job, in insertion order.
    pub fn snapshot(&self, policy: &RetryPolicy) -> Vec<JobSummary> {
        self.lock()
            .iter()
            .map(|job| JobSummary {
                key: job.key.clone(),
                post: job.post.clone(),
                state: job.state,
                attempts: job.attempts,
                created_at: job.created_at,
                last_attempt: job.last_attempt,
                next_eligible_at: policy.next_eligible_at(job),
            })
            .collect()
    }
}
