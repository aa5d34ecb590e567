// Playclip: delayed animated follow-ups for live play-by-play posts.
//
// This is the library root. Detection feeds plays in through
// `followup::Intake`; the `followup::Scheduler` worker matches each one to
// a catalog row, fetches and transcodes its clip, and posts it as a reply.

pub mod config;
pub mod db;
pub mod error;
pub mod followup;
pub mod matching;
pub mod play;
pub mod processed;
pub mod publish;
pub mod savant;
pub mod status;
pub mod transcode;
