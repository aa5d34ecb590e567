// Cross-source match scoring.
//
// A detected play and the catalog share no identifier, so we filter on the
// two fields both sides agree on (inning, batter) and rank what survives by
// an additive score. The contact bonus dominates everything else: within a
// multi-pitch at-bat only the pitch that was put in play has the animation
// we want, and every other pitch in that at-bat carries the same batter,
// inning, and often the same description.

use tracing::debug;

use crate::play::models::{normalize_event_code, PlayRecord};
use crate::savant::models::CandidateAsset;

/// Configurable weights for the additive match score.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchWeights {
    /// Candidate is the pitch that was put in play (default 1000)
    pub contact: u32,
    /// Candidate description contains the play's event text, or vice versa (default 100)
    pub description: u32,
    /// Candidate event code matches the play's classification (default 50)
    pub event: u32,
    /// Batter confirmed (always true for survivors of the filter) (default 25)
    pub batter: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            contact: 1000,
            description: 100,
            event: 50,
            batter: 25,
        }
    }
}

/// Per-component breakdown of one candidate's score. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScore {
    pub contact: bool,
    pub description: bool,
    pub event: bool,
    pub batter: bool,
    pub total: u32,
}

/// Score a single candidate against a play.
///
/// Returns `None` when the candidate fails the inning or batter filter.
pub fn score_candidate(
    play: &PlayRecord,
    candidate: &CandidateAsset,
    weights: &MatchWeights,
) -> Option<MatchScore> {
    if candidate.inning != play.inning {
        return None;
    }
    if !batter_matches(play, candidate) {
        return None;
    }

    let contact = candidate.contact;
    let description = text_overlaps(&candidate.description, &play.event_text);
    let event = event_matches(play, &candidate.event);

    let mut total = weights.batter;
    if contact {
        total += weights.contact;
    }
    if description {
        total += weights.description;
    }
    if event {
        total += weights.event;
    }

    Some(MatchScore {
        contact,
        description,
        event,
        batter: true,
        total,
    })
}

/// Pick the best-scoring candidate for a play.
///
/// Ties go to the first candidate encountered. That is arbitrary for
/// genuinely ambiguous rows (same batter, same inning, both flagged as
/// contact), which the catalog can produce after a review overturns a call.
pub fn best_match<'a>(
    play: &PlayRecord,
    candidates: &'a [CandidateAsset],
    weights: &MatchWeights,
) -> Option<(&'a CandidateAsset, MatchScore)> {
    let mut best: Option<(&CandidateAsset, MatchScore)> = None;

    for candidate in candidates {
        let Some(score) = score_candidate(play, candidate, weights) else {
            continue;
        };
        debug!(
            asset = %candidate.asset_id,
            score = score.total,
            batter = %candidate.batter_name,
            "Scored candidate"
        );
        if best.is_none_or(|(_, b)| score.total > b.total) {
            best = Some((candidate, score));
        }
    }

    best
}

/// Batter filter: names share a substring (case-insensitive, either direction).
/// When the play carries no usable name, fall back to an exact id match.
fn batter_matches(play: &PlayRecord, candidate: &CandidateAsset) -> bool {
    match play.batter.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            let ours = name.to_lowercase();
            let theirs = candidate.batter_name.trim().to_lowercase();
            !theirs.is_empty() && (theirs.contains(&ours) || ours.contains(&theirs))
        }
        _ => matches!(
            (play.batter.id, candidate.batter_id),
            (Some(a), Some(b)) if a == b
        ),
    }
}

/// Lower-case, whitespace-insensitive containment in either direction.
fn text_overlaps(candidate_text: &str, play_text: &str) -> bool {
    let a = squash_whitespace(candidate_text);
    let b = squash_whitespace(play_text);
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn squash_whitespace(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Structured event comparison: the candidate's event code against the
/// play's classification aliases, or against the play's own event text.
fn event_matches(play: &PlayRecord, candidate_event: &str) -> bool {
    let code = normalize_event_code(candidate_event);
    if code.is_empty() {
        return false;
    }
    play.event
        .catalog_aliases()
        .iter()
        .any(|alias| normalize_event_code(alias) == code)
        || normalize_event_code(&play.event_text) == code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::models::{BatterRef, EventKind, Half};
    use chrono::NaiveDate;

    fn play(name: Option<&str>, id: Option<u64>) -> PlayRecord {
        PlayRecord {
            game_pk: 1,
            game_date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            inning: 3,
            half: Half::Bottom,
            at_bat_index: 10,
            event: EventKind::Strikeout,
            event_text: "Strikeout".to_string(),
            batter: BatterRef {
                id,
                name: name.map(str::to_string),
            },
            metrics: None,
        }
    }

    fn candidate(name: &str, id: Option<u64>) -> CandidateAsset {
        CandidateAsset {
            asset_id: "a".to_string(),
            inning: 3,
            batter_name: name.to_string(),
            batter_id: id,
            description: String::new(),
            event: String::new(),
            contact: false,
        }
    }

    #[test]
    fn test_batter_substring_either_direction() {
        let p = play(Some("Alonso"), None);
        assert!(batter_matches(&p, &candidate("Pete Alonso", None)));

        let p = play(Some("Pete Alonso"), None);
        assert!(batter_matches(&p, &candidate("alonso", None)));
    }

    #[test]
    fn test_empty_candidate_name_never_matches() {
        let p = play(Some("Alonso"), None);
        assert!(!batter_matches(&p, &candidate("", None)));
    }

    #[test]
    fn test_id_fallback_when_play_has_no_name() {
        let p = play(None, Some(624413));
        assert!(batter_matches(&p, &candidate("Pete Alonso", Some(624413))));
        assert!(!batter_matches(&p, &candidate("Pete Alonso", Some(1))));
        assert!(!batter_matches(&p, &candidate("Pete Alonso", None)));
    }

    #[test]
    fn test_event_matches_alias_and_text() {
        let p = play(Some("Alonso"), None);
        assert!(event_matches(&p, "strikeout"));
        assert!(event_matches(&p, "strikeout_double_play"));
        assert!(!event_matches(&p, "walk"));
        assert!(!event_matches(&p, ""));
    }

    #[test]
    fn test_text_overlap_ignores_case_and_whitespace() {
        assert!(text_overlaps("Pete Alonso HOME RUN to left", "home run"));
        assert!(text_overlaps("home run", "Pete Alonso homerun to left"));
        assert!(!text_overlaps("", "home run"));
        assert!(!text_overlaps("flies out", "home run"));
    }

    #[test]
    fn test_batter_only_scores_batter_weight() {
        let p = play(Some("Alonso"), None);
        let score = score_candidate(&p, &candidate("Alonso", None), &MatchWeights::default())
            .unwrap();
        assert_eq!(score.total, 25);
        assert!(score.batter);
        assert!(!score.contact);
    }

    #[test]
    fn test_custom_weights_are_used() {
        let weights = MatchWeights {
            contact: 1,
            description: 2,
            event: 4,
            batter: 8,
        };
        let p = play(Some("Alonso"), None);
        let mut c = candidate("Alonso", None);
        c.contact = true;
        c.event = "strikeout".to_string();
        assert_eq!(score_candidate(&p, &c, &weights).unwrap().total, 13);
    }
}
