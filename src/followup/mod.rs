// Follow-up core — delayed animated replies to already-published posts.
//
// Detection hands plays to `Intake`; the `Scheduler` worker retries each
// job under a `RetryPolicy` until the clip is posted or the job gives up.

pub mod intake;
pub mod job;
pub mod policy;
pub mod queue;
pub mod scheduler;
pub mod traits;

pub use intake::Intake;
pub use job::{FollowUpJob, JobState, JobSummary};
pub use policy::{Eligibility, RetryPolicy};
pub use queue::{FollowUpQueue, ScanOutcome};
pub use scheduler::{Collaborators, CycleReport, Scheduler, SchedulerHandle, SchedulerSettings};
pub use traits::{AnimationResolver, CatalogSource, ClipTranscoder, Publisher};
