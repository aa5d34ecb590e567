// Retry policy — grace period, exponential backoff, attempt and age limits.
//
// Evaluated for every pending job on every scan. The age limit is checked
// before the attempt limit, so a job that is both too old and out of
// attempts is reported as expired.

use chrono::{DateTime, Duration, Utc};

use super::job::FollowUpJob;

/// Configurable eligibility policy for follow-up jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Wait before the first attempt (default 30s)
    pub grace_period: Duration,
    /// First retry delay; doubles per failure (default 60s)
    pub backoff_base: Duration,
    /// Upper bound on the retry delay (default 600s)
    pub backoff_cap: Duration,
    /// Attempts allowed before a job is abandoned (default 10)
    pub max_attempts: u32,
    /// Age at which a job expires regardless of attempts (default 1800s)
    pub max_age: Duration,
    /// Whether an oversize artifact counts as a retryable failure (default true).
    /// When false the job is abandoned on the first oversize result.
    pub retry_oversize: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            grace_period: Duration::seconds(30),
            backoff_base: Duration::seconds(60),
            backoff_cap: Duration::seconds(600),
            max_attempts: 10,
            max_age: Duration::seconds(1800),
            retry_oversize: true,
        }
    }
}

/// What a scan should do with a pending job right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Too old: transition to Expired.
    Expire,
    /// Out of attempts: transition to Abandoned.
    Abandon,
    /// Not yet; check again at or after this time.
    Wait(DateTime<Utc>),
    /// Attempt now.
    Ready,
}

impl RetryPolicy {
    /// Delay required after the `failures`-th consecutive failure:
    /// `min(base * 2^(failures-1), cap)`.
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        2i32.checked_pow(exponent)
            .and_then(|factor| self.backoff_base.checked_mul(factor))
            .map_or(self.backoff_cap, |delay| delay.min(self.backoff_cap))
    }

    /// Earliest time the job may be attempted again.
    pub fn next_eligible_at(&self, job: &FollowUpJob) -> DateTime<Utc> {
        match job.last_attempt {
            Some(last) if job.attempts > 0 => last + self.backoff(job.attempts),
            _ => job.created_at + self.grace_period,
        }
    }

    /// Decide what to do with a pending job at `now`.
    pub fn evaluate(&self, job: &FollowUpJob, now: DateTime<Utc>) -> Eligibility {
        if now - job.created_at >= self.max_age {
            return Eligibility::Expire;
        }
        if job.attempts >= self.max_attempts {
            return Eligibility::Abandon;
        }
        let next = self.next_eligible_at(job);
        if now >= next {
            Eligibility::Ready
        } else {
            Eligibility::Wait(next)
        }
    }
}
