// HTTP client for the animation catalog's game feed.
//
// Queries `/gf?game_pk=…` for every pitch row in a game and converts them
// into CandidateAssets. The catalog fills in gradually as the game is
// processed, so this is called fresh on every matching attempt; nothing
// is cached between attempts.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use super::models::{CandidateAsset, GameFeedResponse};
use crate::followup::traits::CatalogSource;

/// Default catalog + media origin.
pub const DEFAULT_SAVANT_URL: &str = "https://baseballsavant.mlb.com";

pub(crate) const USER_AGENT: &str = "playclip/0.1 (play follow-ups)";

/// Client for the catalog's game feed endpoint.
pub struct SavantClient {
    client: reqwest::Client,
    base_url: String,
}

impl SavantClient {
    /// Create a new catalog client pointing at the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and decode the raw game feed.
    pub async fn game_feed(&self, game_pk: u64) -> Result<GameFeedResponse> {
        let url = format!("{}/gf", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("game_pk", game_pk.to_string()), ("at_bat_number", "1".to_string())])
            .send()
            .await
            .with_context(|| format!("Game feed request failed for game {game_pk}"))?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Game feed for {game_pk} returned {status}");
        }

        response
            .json::<GameFeedResponse>()
            .await
            .with_context(|| format!("Failed to parse game feed for {game_pk}"))
    }
}

#[async_trait]
impl CatalogSource for SavantClient {
    async fn candidates(&self, game_pk: u64, game_date: NaiveDate) -> Result<Vec<CandidateAsset>> {
        let candidates = self.game_feed(game_pk).await?.into_candidates();
        debug!(
            game_pk,
            %game_date,
            count = candidates.len(),
            "Fetched catalog candidates"
        );
        Ok(candidates)
    }
}
