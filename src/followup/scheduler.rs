// Follow-up scheduler — the worker that turns queued jobs into posted clips.
//
// One task runs the loop: scan the queue, attempt every ready job in
// insertion order (catalog → match → resolve → transcode → publish), then
// sleep for the cycle interval. Each stage's failure is folded into a
// FollowUpError and counted against that job alone; nothing a single job
// does can stop the cycle or affect another job.
//
// Shutdown is cooperative. `stop()` is only observed between cycles, so an
// attempt already underway (including an ffmpeg run) finishes first.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::job::FollowUpJob;
use super::policy::RetryPolicy;
use super::queue::FollowUpQueue;
use super::traits::{AnimationResolver, CatalogSource, ClipTranscoder, Publisher};
use crate::error::{FollowUpError, Unavailable};
use crate::matching::score::{best_match, MatchWeights};
use crate::processed::ProcessedSet;

/// How often the processed set is swept, at most.
const SWEEP_INTERVAL_SECS: i64 = 3600;

/// The four outside-world collaborators a follow-up attempt needs.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn CatalogSource>,
    pub resolver: Arc<dyn AnimationResolver>,
    pub transcoder: Arc<dyn ClipTranscoder>,
    pub publisher: Arc<dyn Publisher>,
}

/// Loop timing and per-attempt transcode limits.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    /// Sleep between cycles (default 15s)
    pub cycle_interval: StdDuration,
    /// Longest clip the transcoder will encode (default 10s)
    pub max_duration_secs: u32,
    /// Largest artifact that may be published (default 15 MiB)
    pub max_bytes: u64,
    /// How long processed at-bats are remembered (default 30 days)
    pub processed_retention: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            cycle_interval: StdDuration::from_secs(15),
            max_duration_secs: 10,
            max_bytes: 15 * 1024 * 1024,
            processed_retention: Duration::days(30),
        }
    }
}

/// Per-cycle tallies, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub retried: usize,
    pub abandoned: usize,
    pub expired: usize,
}

impl CycleReport {
    pub fn is_idle(&self) -> bool {
        *self == CycleReport::default()
    }
}

pub struct Scheduler {
    queue: FollowUpQueue,
    collaborators: Collaborators,
    policy: RetryPolicy,
    weights: MatchWeights,
    settings: SchedulerSettings,
    processed: Option<Arc<ProcessedSet>>,
    last_sweep: Mutex<Option<DateTime<Utc>>>,
}

impl Scheduler {
    pub fn new(queue: FollowUpQueue, collaborators: Collaborators) -> Self {
        Self {
            queue,
            collaborators,
            policy: RetryPolicy::default(),
            weights: MatchWeights::default(),
            settings: SchedulerSettings::default(),
            processed: None,
            last_sweep: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_settings(mut self, settings: SchedulerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sweep this processed set (at most hourly) as part of the loop.
    pub fn with_processed(mut self, processed: Arc<ProcessedSet>) -> Self {
        self.processed = Some(processed);
        self
    }

    pub fn queue(&self) -> &FollowUpQueue {
        &self.queue
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run one full pipeline attempt for a job.
    ///
    /// The catalog is queried fresh every time; nothing from a previous
    /// attempt is reused. The artifact is deleted once publishing returns,
    /// whether or not it succeeded.
    pub async fn attempt(&self, job: &FollowUpJob) -> Result<(), FollowUpError> {
        let play = &job.play;

        let candidates = self
            .collaborators
            .catalog
            .candidates(play.game_pk, play.game_date)
            .await
            .map_err(|e| {
                debug!(job = %job.key, error = %e, "Catalog query failed");
                FollowUpError::NotYetAvailable(Unavailable::CatalogUnavailable)
            })?;

        if candidates.is_empty() {
            return Err(FollowUpError::NotYetAvailable(Unavailable::NoCandidates));
        }

        let (candidate, score) = best_match(play, &candidates, &self.weights)
            .ok_or(FollowUpError::NotYetAvailable(Unavailable::NoMatch))?;
        debug!(
            job = %job.key,
            asset = %candidate.asset_id,
            score = score.total,
            "Matched catalog row"
        );

        let url = self
            .collaborators
            .resolver
            .resolve(candidate)
            .await
            .ok_or(FollowUpError::NotYetAvailable(Unavailable::MediaUnpublished))?;

        let artifact = self
            .collaborators
            .transcoder
            .transcode(
                &url,
                self.settings.max_duration_secs,
                self.settings.max_bytes,
            )
            .await?;

        let published = self
            .collaborators
            .publisher
            .publish(&artifact, &job.post)
            .await;

        if let Err(e) = tokio::fs::remove_file(&artifact).await {
            warn!(path = %artifact.display(), error = %e, "Failed to delete artifact");
        }

        match published {
            Ok(true) => Ok(()),
            Ok(false) => Err(FollowUpError::PublishFailure(
                "publisher reported failure".to_string(),
            )),
            Err(e) => Err(FollowUpError::PublishFailure(format!("{e:#}"))),
        }
    }

    /// One scan-and-process pass at time `now`.
    ///
    /// `now` is both the eligibility clock and the recorded attempt time for
    /// every job attempted in this cycle.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let outcome = self.queue.scan(&self.policy, now);
        let mut report = CycleReport {
            expired: outcome.expired.len(),
            abandoned: outcome.abandoned.len(),
            ..CycleReport::default()
        };

        for job in outcome.ready {
            report.attempted += 1;
            match self.attempt(&job).await {
                Ok(()) => {
                    self.queue.complete(&job.key);
                    report.succeeded += 1;
                    info!(job = %job.key, post = %job.post, "Follow-up posted");
                }
                Err(FollowUpError::OversizeArtifact { bytes, limit })
                    if !self.policy.retry_oversize =>
                {
                    self.queue.remove(&job.key);
                    report.abandoned += 1;
                    warn!(
                        job = %job.key,
                        bytes,
                        limit,
                        "Giving up on follow-up: artifact too large"
                    );
                }
                Err(e) => {
                    let attempts = self.queue.fail(&job.key, now).unwrap_or_default();
                    report.retried += 1;
                    match e {
                        FollowUpError::NotYetAvailable(_) => {
                            info!(job = %job.key, attempts, reason = %e, "Follow-up not ready")
                        }
                        _ => warn!(
                            job = %job.key,
                            attempts,
                            kind = e.kind(),
                            error = %e,
                            "Follow-up attempt failed"
                        ),
                    }
                }
            }
        }

        self.maybe_sweep(now).await;
        report
    }

    async fn maybe_sweep(&self, now: DateTime<Utc>) {
        let Some(processed) = &self.processed else {
            return;
        };
        {
            let mut last = self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
            if last.is_some_and(|at| now - at < Duration::seconds(SWEEP_INTERVAL_SECS)) {
                return;
            }
            *last = Some(now);
        }
        if let Err(e) = processed
            .sweep(now, self.settings.processed_retention)
            .await
        {
            warn!(error = %e, "Processed-set sweep failed");
        }
    }

    /// Run cycles until `stop` flips to true.
    ///
    /// Collaborator panics are not caught. A panic ends the task and leaves
    /// the job it was attempting InProgress in the queue, where `scan` no
    /// longer looks at it; `SchedulerHandle::is_finished` reports the exit.
    pub async fn run(self: Arc<Self>, mut stop: watch::Receiver<bool>) {
        info!(
            interval_secs = self.settings.cycle_interval.as_secs(),
            "Follow-up scheduler started"
        );

        loop {
            if *stop.borrow() {
                break;
            }

            let report = self.run_cycle(Utc::now()).await;
            if !report.is_idle() {
                info!(
                    attempted = report.attempted,
                    succeeded = report.succeeded,
                    retried = report.retried,
                    abandoned = report.abandoned,
                    expired = report.expired,
                    pending = self.queue.len(),
                    "Follow-up cycle finished"
                );
            }

            tokio::select! {
                // Err means every sender is gone; treat that as a stop too.
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.settings.cycle_interval) => {}
            }
        }

        info!(pending = self.queue.len(), "Follow-up scheduler stopped");
    }

    /// Start the loop on its own task.
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        SchedulerHandle { stop_tx, task }
    }
}

/// Control handle for a spawned scheduler.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the loop to exit before its next cycle.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Wait for the loop to exit.
    pub async fn join(self) -> anyhow::Result<()> {
        self.task.await?;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
