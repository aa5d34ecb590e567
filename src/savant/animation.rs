// Animation fetcher — turns a matched candidate into a media URL.
//
// The media origin uses a fixed path per asset id. We only probe it (HEAD,
// no body) here: a missing or slow asset usually just means it hasn't been
// published yet, so every failure is reported as "not available" rather
// than as an error.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::client::USER_AGENT;
use super::models::CandidateAsset;
use crate::followup::traits::AnimationResolver;

/// How long to wait on the existence probe before giving up for this attempt.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves candidates to probed media URLs on the catalog's media origin.
pub struct AnimationFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl AnimationFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, PROBE_TIMEOUT)
    }

    /// Like `new`, with a custom probe timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Canonical media URL for an asset id.
    pub fn media_url(&self, asset_id: &str) -> String {
        format!("{}/sporty-videos/webm/{}.webm", self.base_url, asset_id)
    }

    /// Probe `url` and report whether it currently answers with a success status.
    pub async fn probe(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                debug!(url, status = %resp.status(), "Media not available yet");
                false
            }
            Err(e) => {
                debug!(url, error = %e, "Media probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl AnimationResolver for AnimationFetcher {
    async fn resolve(&self, candidate: &CandidateAsset) -> Option<String> {
        let url = self.media_url(&candidate.asset_id);
        if self.probe(&url).await {
            info!(url = %url, "Resolved animation");
            Some(url)
        } else {
            None
        }
    }
}
