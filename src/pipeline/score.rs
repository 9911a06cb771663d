//! Match scoring of tracks against a mood profile.

use tracing::debug;

use crate::model::{HintMap, MoodCategory, MoodProfile, ScoredTrack, Track};

const PRIMARY_MATCH_POINTS: i32 = 40;
const SIMILAR_MATCH_POINTS: i32 = 25;
const DISTANCE_POINTS: f32 = 25.0;
const DANCE_BONUS: i32 = 10;
const ACOUSTIC_BONUS: i32 = 10;
const INSTRUMENTAL_BONUS: i32 = 5;

/// Score a single track on the 0–100 scale with the rule-based formula.
#[must_use]
pub fn score(track: &Track, profile: &MoodProfile) -> u8 {
    let features = track.features.unwrap_or_default().resolved();
    let target = profile.category();
    let mut total = 0i32;

    match track.category {
        Some(category) if category == target => total += PRIMARY_MATCH_POINTS,
        Some(category) if profile.similar_categories().contains(&category) => {
            total += SIMILAR_MATCH_POINTS;
        }
        _ => {}
    }

    total += closeness_points(features.energy, profile.target_energy());
    total += closeness_points(features.valence, profile.target_valence());

    match target {
        MoodCategory::PartyDance | MoodCategory::HappyEnergetic if features.danceability > 0.6 => {
            total += DANCE_BONUS;
        }
        MoodCategory::CalmPeaceful | MoodCategory::Romantic | MoodCategory::Melancholic
            if features.acousticness > 0.4 =>
        {
            total += ACOUSTIC_BONUS;
        }
        MoodCategory::ChillAmbient | MoodCategory::Motivational
            if features.instrumentalness > 0.3 =>
        {
            total += INSTRUMENTAL_BONUS;
        }
        _ => {}
    }

    clamp_score(total)
}

/// `round((1 - |value - target|) * 25)`.
// closeness is in [0, 1], so the product always fits in an i32.
#[allow(clippy::cast_possible_truncation)]
fn closeness_points(value: f32, target: f32) -> i32 {
    let closeness = (1.0 - (value - target).abs()).clamp(0.0, 1.0);
    (closeness * DISTANCE_POINTS).round() as i32
}

fn clamp_score(total: i32) -> u8 {
    u8::try_from(total.clamp(0, 100)).unwrap_or(100)
}

/// Score every track. A hint for a track replaces the formula for that
/// track and contributes its reason.
#[must_use]
pub fn score_tracks(tracks: Vec<Track>, profile: &MoodProfile, hints: Option<&HintMap>) -> Vec<ScoredTrack> {
    let mut hinted = 0usize;
    let scored: Vec<ScoredTrack> = tracks
        .into_iter()
        .map(|track| {
            if let Some(hint) = hints.and_then(|map| map.get(&track.id)) {
                hinted += 1;
                return ScoredTrack {
                    mood_score: hint.score.min(100),
                    reason: hint.reason.clone(),
                    track,
                };
            }
            ScoredTrack {
                mood_score: score(&track, profile),
                reason: None,
                track,
            }
        })
        .collect();

    debug!(
        total = scored.len(),
        hinted,
        target = %profile.category(),
        "scored tracks"
    );
    scored
}
