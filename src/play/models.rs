// Data models for detected plays.
//
// These are explicit records rather than the loosely-shaped JSON the feed
// returns: required fields are plain values, and anything the feed often
// omits (batter name, physical metrics) is an Option.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Coarse classification of a play's outcome, as decided by the feed classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    HomeRun,
    Hit,
    Strikeout,
    Walk,
    Other,
}

impl EventKind {
    /// Classify a feed result string such as "Home Run" or "Intent Walk".
    pub fn from_feed_event(event: &str) -> Self {
        match normalize_event_code(event).as_str() {
            "homerun" => EventKind::HomeRun,
            "single" | "double" | "triple" => EventKind::Hit,
            "strikeout" | "strikeoutdoubleplay" => EventKind::Strikeout,
            "walk" | "intentwalk" => EventKind::Walk,
            _ => EventKind::Other,
        }
    }

    /// Catalog `events` codes that correspond to this kind.
    ///
    /// `Other` has no fixed aliases. Callers compare against the play's
    /// free-text event instead.
    pub fn catalog_aliases(&self) -> &'static [&'static str] {
        match self {
            EventKind::HomeRun => &["home_run"],
            EventKind::Hit => &["single", "double", "triple"],
            EventKind::Strikeout => &["strikeout", "strikeout_double_play"],
            EventKind::Walk => &["walk", "intent_walk"],
            EventKind::Other => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::HomeRun => "home_run",
            EventKind::Hit => "hit",
            EventKind::Strikeout => "strikeout",
            EventKind::Walk => "walk",
            EventKind::Other => "other",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which half of the inning the play happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Half {
    Top,
    Bottom,
}

/// The batter, as identified by the primary feed. At least one of the two
/// fields is normally present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatterRef {
    pub id: Option<u64>,
    pub name: Option<String>,
}

/// Batted-ball measurements. Frequently absent (strikeouts, walks, or the
/// tracking system simply hasn't published yet), so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitMetrics {
    /// Exit velocity in mph
    pub exit_velocity: Option<f64>,
    /// Launch angle in degrees
    pub launch_angle: Option<f64>,
    /// Projected distance in feet
    pub distance: Option<f64>,
}

/// A single detected play. Created once per detection and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub game_pk: u64,
    pub game_date: NaiveDate,
    pub inning: u32,
    pub half: Half,
    pub at_bat_index: u32,
    pub event: EventKind,
    /// The feed's free-text result, e.g. "Home Run" or "Grounded Into DP".
    pub event_text: String,
    pub batter: BatterRef,
    #[serde(default)]
    pub metrics: Option<HitMetrics>,
}

impl PlayRecord {
    /// The stable dedup identifier for this play's at-bat.
    pub fn at_bat_key(&self) -> AtBatKey {
        AtBatKey::new(self.game_pk, self.inning, self.at_bat_index, self.game_date)
    }
}

/// Deterministic identifier for one at-bat: `{date}_{game}_{inning}_{index}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtBatKey(String);

impl AtBatKey {
    pub fn new(game_pk: u64, inning: u32, at_bat_index: u32, date: NaiveDate) -> Self {
        Self(format!(
            "{}_{}_{}_{}",
            date.format("%Y-%m-%d"),
            game_pk,
            inning,
            at_bat_index
        ))
    }

    /// Rehydrate a key previously produced by `new` (e.g. from the store).
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AtBatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to the already-published primary post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRef(pub String);

impl std::fmt::Display for PostRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case and strip everything that isn't a letter or digit, so
/// "Home Run", "home_run" and "homerun" all compare equal.
pub fn normalize_event_code(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
