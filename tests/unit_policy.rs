// Unit tests for the follow-up retry policy and queue lifecycle.
//
// Everything runs on a synthetic clock: `t(n)` is n seconds after job
// creation.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use playclip::followup::{Eligibility, FollowUpJob, FollowUpQueue, JobState, RetryPolicy};
use playclip::play::models::{BatterRef, EventKind, Half, PlayRecord, PostRef};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
}

fn play(at_bat_index: u32) -> PlayRecord {
    PlayRecord {
        game_pk: 777483,
        game_date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
        inning: 6,
        half: Half::Bottom,
        at_bat_index,
        event: EventKind::HomeRun,
        event_text: "Home Run".to_string(),
        batter: BatterRef::default(),
        metrics: None,
    }
}

fn job() -> FollowUpJob {
    FollowUpJob::new(play(44), PostRef("post-1".to_string()), t(0))
}

#[test]
fn backoff_doubles_then_caps() {
    let policy = RetryPolicy::default();
    let delays: Vec<i64> = (1..=6).map(|n| policy.backoff(n).num_seconds()).collect();
    assert_eq!(delays, vec![60, 120, 240, 480, 600, 600]);
}

#[test]
fn next_eligible_follows_grace_then_backoff() {
    let policy = RetryPolicy::default();
    let mut job = job();
    assert_eq!(policy.next_eligible_at(&job), t(30));

    job.record_failure(t(30));
    assert_eq!(policy.next_eligible_at(&job), t(90));

    job.record_failure(t(90));
    assert_eq!(policy.next_eligible_at(&job), t(210));
}

#[test]
fn expiry_wins_over_remaining_budget() {
    let policy = RetryPolicy::default();
    let mut job = job();
    job.record_failure(t(30));
    job.record_failure(t(90));
    assert_eq!(policy.evaluate(&job, t(1799)), Eligibility::Ready);
    assert_eq!(policy.evaluate(&job, t(1800)), Eligibility::Expire);
}

#[test]
fn exhausted_budget_abandons_before_age_limit() {
    let policy = RetryPolicy::default();
    let mut job = job();
    for i in 0..10 {
        job.record_failure(t(30 + i));
    }
    assert_eq!(policy.evaluate(&job, t(100)), Eligibility::Abandon);
}

#[test]
fn custom_policy_values_are_respected() {
    let policy = RetryPolicy {
        grace_period: Duration::seconds(5),
        backoff_base: Duration::seconds(10),
        backoff_cap: Duration::seconds(25),
        max_attempts: 2,
        max_age: Duration::seconds(100),
        retry_oversize: false,
    };
    let mut job = job();
    assert_eq!(policy.evaluate(&job, t(5)), Eligibility::Ready);
    job.record_failure(t(5));
    assert_eq!(policy.evaluate(&job, t(14)), Eligibility::Wait(t(15)));
    job.record_failure(t(15));
    assert_eq!(policy.evaluate(&job, t(16)), Eligibility::Abandon);
    assert_eq!(policy.backoff(3), Duration::seconds(25));
}

#[test]
fn enqueue_rejects_duplicate_key_in_any_state() {
    let queue = FollowUpQueue::new();
    assert!(queue.enqueue(job()));
    assert!(!queue.enqueue(FollowUpJob::new(play(44), PostRef("other".to_string()), t(1))));

    // Still rejected while the first one is in progress.
    let ready = queue.scan(&RetryPolicy::default(), t(30)).ready;
    assert_eq!(ready.len(), 1);
    assert!(!queue.enqueue(job()));
    assert_eq!(queue.len(), 1);

    // A different at-bat is fine.
    assert!(queue.enqueue(FollowUpJob::new(play(45), PostRef("p2".to_string()), t(1))));
    assert_eq!(queue.len(), 2);
}

#[test]
fn scan_removes_expired_jobs() {
    let queue = FollowUpQueue::new();
    let j = job();
    let key = j.key.clone();
    queue.enqueue(j);

    let outcome = queue.scan(&RetryPolicy::default(), t(1800));
    assert_eq!(outcome.expired, vec![key.clone()]);
    assert!(outcome.ready.is_empty());
    assert!(!queue.contains(&key));
}

#[test]
fn completed_job_frees_its_key() {
    let queue = FollowUpQueue::new();
    let j = job();
    let key = j.key.clone();
    queue.enqueue(j);
    queue.scan(&RetryPolicy::default(), t(30));
    assert!(queue.complete(&key));
    assert!(queue.is_empty());
    assert!(queue.enqueue(job()));
}

#[test]
fn snapshot_reports_state_and_next_eligible() {
    let queue = FollowUpQueue::new();
    queue.enqueue(job());
    let snapshot = queue.snapshot(&RetryPolicy::default());
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].state, JobState::Pending);
    assert_eq!(snapshot[0].attempts, 0);
    assert_eq!(snapshot[0].next_eligible_at, t(30));
    assert_eq!(snapshot[0].key.as_str(), "2025-06-16_777483_6_44");
}

#[test]
fn concurrent_enqueue_keeps_one_job_per_key() {
    let queue = FollowUpQueue::new();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let queue = queue.clone();
            std::thread::spawn(move || {
                let post = PostRef(format!("post-{i}"));
                queue.enqueue(FollowUpJob::new(play(i % 2), post, t(0)))
            })
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(accepted, 2);
    assert_eq!(queue.len(), 2);
}
