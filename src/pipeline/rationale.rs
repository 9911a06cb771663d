//! Short human-readable reasons for selected tracks.
//!
//! Phrases come from a fixed, ordered bank keyed on feature thresholds,
//! followed by a category phrase when the track matches the requested mood.
//! At most two phrases are kept, so feature phrases take precedence.

use crate::model::{MoodCategory, ScoredTrack, Track};

/// Returned when no phrase qualifies or the track has no features.
pub const FALLBACK_REASON: &str = "Fits your vibe";

const MAX_PHRASES: usize = 2;

/// Produces the reason string attached to a selected track.
pub trait RationaleGenerator: Send + Sync {
    fn explain(&self, track: &Track, target: MoodCategory) -> String;
}

/// Phrase-bank implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRationaleGenerator;

impl RationaleGenerator for DefaultRationaleGenerator {
    fn explain(&self, track: &Track, target: MoodCategory) -> String {
        explain(track, target)
    }
}

/// Explain why `track` fits the `target` mood.
#[must_use]
pub fn explain(track: &Track, target: MoodCategory) -> String {
    let Some(features) = track.features.as_ref() else {
        return FALLBACK_REASON.to_string();
    };
    let f = features.clamped();

    let bank: [(Option<f32>, fn(f32) -> bool, &str); 7] = [
        (f.energy, |v| v > 0.7, "high energy"),
        (f.energy, |v| v < 0.3, "calm and relaxing"),
        (f.valence, |v| v > 0.7, "uplifting vibes"),
        (f.valence, |v| v < 0.3, "emotional depth"),
        (f.danceability, |v| v > 0.7, "great beat"),
        (f.acousticness, |v| v > 0.6, "acoustic feel"),
        (f.instrumentalness, |v| v > 0.5, "instrumental focus"),
    ];

    let category_phrase = (track.category == Some(target))
        .then(|| format!("perfect for {} mood", target.label()));

    let phrases: Vec<String> = bank
        .iter()
        .filter_map(|(value, qualifies, phrase)| {
            value.filter(|v| qualifies(*v)).map(|_| (*phrase).to_string())
        })
        .chain(category_phrase)
        .take(MAX_PHRASES)
        .collect();

    if phrases.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        phrases.join(", ")
    }
}

/// Fill in reasons for tracks that do not carry one yet. Reasons supplied by
/// a hint or by the fill pass are kept.
pub fn annotate(
    generator: &dyn RationaleGenerator,
    tracks: &mut [ScoredTrack],
    target: MoodCategory,
) {
    for scored in tracks.iter_mut().filter(|scored| scored.reason.is_none()) {
        scored.reason = Some(generator.explain(&scored.track, target));
    }
}
