// Catalog rows — the secondary source's view of a game, pitch by pitch.
//
// The game feed has no identifier in common with the primary feed. All we
// get per pitch is free text, an inning, a batter name, and the pitch
// result; the opaque `play_id` is only useful for building the media URL.

use serde::{Deserialize, Deserializer, Serialize};

/// One catalog row that may be linked to a recorded animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAsset {
    /// Opaque asset identifier (the catalog's play UUID).
    pub asset_id: String,
    pub inning: u32,
    pub batter_name: String,
    pub batter_id: Option<u64>,
    /// Free-text play description, e.g. "Pete Alonso homers (20) on a fly ball…"
    pub description: String,
    /// Structured event code, e.g. "home_run". Empty on non-terminal pitches.
    pub event: String,
    /// True when this is the pitch that was put in play.
    pub contact: bool,
}

/// Raw response from the catalog's game feed endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameFeedResponse {
    #[serde(default)]
    pub team_home: Vec<FeedPitch>,
    #[serde(default)]
    pub team_away: Vec<FeedPitch>,
}

/// A single pitch row from the game feed. Every field is optional because
/// rows for pitches still being processed arrive half-populated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPitch {
    #[serde(default)]
    pub play_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub inning: Option<u64>,
    #[serde(default)]
    pub batter_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub batter: Option<u64>,
    #[serde(default)]
    pub des: Option<String>,
    #[serde(default)]
    pub events: Option<String>,
    #[serde(default)]
    pub pitch_call: Option<String>,
    #[serde(default)]
    pub call: Option<String>,
}

impl FeedPitch {
    /// Convert to a candidate. Rows without a play id or inning can never be
    /// resolved to media, so they are dropped here.
    pub fn into_candidate(self) -> Option<CandidateAsset> {
        let asset_id = self.play_id.filter(|id| !id.trim().is_empty())?;
        let inning = u32::try_from(self.inning?).ok()?;

        let contact = self.pitch_call.as_deref() == Some("hit_into_play")
            || self.call.as_deref() == Some("X");

        Some(CandidateAsset {
            asset_id,
            inning,
            batter_name: self.batter_name.unwrap_or_default(),
            batter_id: self.batter,
            description: self.des.unwrap_or_default(),
            event: self.events.unwrap_or_default(),
            contact,
        })
    }
}

impl GameFeedResponse {
    /// All usable candidates, home rows first, in feed order.
    pub fn into_candidates(self) -> Vec<CandidateAsset> {
        self.team_home
            .into_iter()
            .chain(self.team_away)
            .filter_map(FeedPitch::into_candidate)
            .collect()
    }
}

/// The feed is inconsistent about numeric fields: sometimes `6`, sometimes
/// `"6"`, sometimes `""`. Accept all three.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
