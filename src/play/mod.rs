// Play records — the immutable output of the primary feed's detection step.
//
// The feed poller and classifier live outside this crate; they hand us
// PlayRecords and we key everything (dedup, follow-up jobs) off the
// deterministic at-bat identifier derived from each one.

pub mod models;
