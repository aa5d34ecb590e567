// Savant — the independently-indexed animation catalog and its media origin.
//
// `client` queries the per-game catalog for candidate rows, `animation`
// resolves a matched row to a probed media URL.

pub mod animation;
pub mod client;
pub mod models;
