//! Domain records shared by every stage of the curation pipeline.
//!
//! Records are plain values: stages return new annotated records instead of
//! mutating the ones they receive.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Duration assumed for a track whose source did not report one.
pub const DEFAULT_TRACK_DURATION_MS: u64 = 210_000;

/// The closed set of mood categories. Declaration order is the canonical
/// display and iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    HappyEnergetic,
    CalmPeaceful,
    Melancholic,
    PartyDance,
    Romantic,
    Motivational,
    ChillAmbient,
    IntenseAggressive,
}

impl MoodCategory {
    pub const ALL: [MoodCategory; 8] = [
        MoodCategory::HappyEnergetic,
        MoodCategory::CalmPeaceful,
        MoodCategory::Melancholic,
        MoodCategory::PartyDance,
        MoodCategory::Romantic,
        MoodCategory::Motivational,
        MoodCategory::ChillAmbient,
        MoodCategory::IntenseAggressive,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HappyEnergetic => "happy_energetic",
            Self::CalmPeaceful => "calm_peaceful",
            Self::Melancholic => "melancholic",
            Self::PartyDance => "party_dance",
            Self::Romantic => "romantic",
            Self::Motivational => "motivational",
            Self::ChillAmbient => "chill_ambient",
            Self::IntenseAggressive => "intense_aggressive",
        }
    }

    /// Human readable label, e.g. `"happy energetic"`.
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// The two categories that are an acceptable substitute for this one.
    #[must_use]
    pub fn neighbours(self) -> [MoodCategory; 2] {
        match self {
            Self::HappyEnergetic => [Self::PartyDance, Self::Motivational],
            Self::CalmPeaceful => [Self::ChillAmbient, Self::Romantic],
            Self::Melancholic => [Self::Romantic, Self::CalmPeaceful],
            Self::PartyDance => [Self::HappyEnergetic, Self::Motivational],
            Self::Romantic => [Self::CalmPeaceful, Self::Melancholic],
            Self::Motivational => [Self::HappyEnergetic, Self::IntenseAggressive],
            Self::ChillAmbient => [Self::CalmPeaceful, Self::Melancholic],
            Self::IntenseAggressive => [Self::Motivational, Self::PartyDance],
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for MoodCategory {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(raw.to_string()))
    }
}

/// Where a track's feature vector came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    /// Reported by an authoritative audio-feature API.
    #[default]
    Provided,
    /// Guessed by a text-based analyzer from title and artist.
    Inferred,
    /// Derived heuristically from popularity and the explicit flag.
    Estimated,
}

/// Sonic descriptors of a track. Any dimension may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(default)]
    pub energy: Option<f32>,
    #[serde(default)]
    pub valence: Option<f32>,
    #[serde(default)]
    pub danceability: Option<f32>,
    #[serde(default)]
    pub acousticness: Option<f32>,
    #[serde(default)]
    pub instrumentalness: Option<f32>,
    #[serde(default)]
    pub source: FeatureSource,
}

impl FeatureVector {
    #[must_use]
    pub fn complete(
        energy: f32,
        valence: f32,
        danceability: f32,
        acousticness: f32,
        instrumentalness: f32,
        source: FeatureSource,
    ) -> Self {
        Self {
            energy: Some(energy),
            valence: Some(valence),
            danceability: Some(danceability),
            acousticness: Some(acousticness),
            instrumentalness: Some(instrumentalness),
            source,
        }
        .clamped()
    }

    /// Copy with every present dimension clamped to `[0, 1]`. NaN becomes absent.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            energy: self.energy.and_then(unit),
            valence: self.valence.and_then(unit),
            danceability: self.danceability.and_then(unit),
            acousticness: self.acousticness.and_then(unit),
            instrumentalness: self.instrumentalness.and_then(unit),
            source: self.source,
        }
    }

    /// Fill missing dimensions with neutral values: 0.5, or 0 for instrumentalness.
    #[must_use]
    pub fn resolved(&self) -> ResolvedFeatures {
        let clamped = self.clamped();
        ResolvedFeatures {
            energy: clamped.energy.unwrap_or(0.5),
            valence: clamped.valence.unwrap_or(0.5),
            danceability: clamped.danceability.unwrap_or(0.5),
            acousticness: clamped.acousticness.unwrap_or(0.5),
            instrumentalness: clamped.instrumentalness.unwrap_or(0.0),
        }
    }
}

fn unit(value: f32) -> Option<f32> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(0.0, 1.0))
    }
}

/// A fully populated feature vector used by the arithmetic stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFeatures {
    pub energy: f32,
    pub valence: f32,
    pub danceability: f32,
    pub acousticness: f32,
    pub instrumentalness: f32,
}

/// One playable item of a playlist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// All artist names joined into one display string.
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Popularity on a 0–100 scale.
    #[serde(default)]
    pub popularity: Option<u8>,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub features: Option<FeatureVector>,
    #[serde(default)]
    pub category: Option<MoodCategory>,
}

impl Track {
    /// Duration used for selection arithmetic. The stored value is never rewritten.
    #[must_use]
    pub fn effective_duration_ms(&self, fallback_ms: u64) -> u64 {
        self.duration_ms.unwrap_or(fallback_ms)
    }

    /// Case-insensitive artist key used for diversity accounting.
    #[must_use]
    pub fn artist_key(&self) -> String {
        self.artist
            .as_deref()
            .map(str::trim)
            .filter(|artist| !artist.is_empty())
            .unwrap_or("unknown")
            .to_lowercase()
    }

    #[must_use]
    pub fn with_features(self, features: FeatureVector) -> Self {
        Self {
            features: Some(features.clamped()),
            ..self
        }
    }

    #[must_use]
    pub fn with_category(self, category: Option<MoodCategory>) -> Self {
        Self { category, ..self }
    }
}

/// Qualitative hints from mood analysis, used only as scoring bonuses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MusicCharacteristics {
    #[serde(default)]
    pub tempo_preference: Option<String>,
    #[serde(default)]
    pub energy_preference: Option<String>,
    #[serde(default)]
    pub danceability_preference: Option<String>,
    #[serde(default)]
    pub acousticness_preference: Option<String>,
    #[serde(default)]
    pub instrumentalness_preference: Option<String>,
}

/// Target state for one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MoodProfileFields")]
pub struct MoodProfile {
    category: MoodCategory,
    similar_categories: Vec<MoodCategory>,
    energy_level: u8,
    valence_level: u8,
    characteristics: MusicCharacteristics,
    #[serde(default)]
    emotions: Vec<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    interpretation: Option<String>,
}

/// Deserialized shape of [`MoodProfile`], normalized through its constructor.
#[derive(Deserialize)]
struct MoodProfileFields {
    category: MoodCategory,
    #[serde(default)]
    similar_categories: Vec<MoodCategory>,
    energy_level: u8,
    valence_level: u8,
    #[serde(default)]
    characteristics: MusicCharacteristics,
    #[serde(default)]
    emotions: Vec<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    interpretation: Option<String>,
}

impl From<MoodProfileFields> for MoodProfile {
    fn from(fields: MoodProfileFields) -> Self {
        MoodProfile::new(
            fields.category,
            fields.similar_categories,
            fields.energy_level,
            fields.valence_level,
            fields.characteristics,
        )
        .with_notes(fields.emotions, fields.confidence, fields.interpretation)
    }
}

impl MoodProfile {
    /// Levels are clamped to `1..=10`; similar categories are de-duplicated,
    /// stripped of the primary category and truncated to two entries.
    #[must_use]
    pub fn new(
        category: MoodCategory,
        similar_categories: impl IntoIterator<Item = MoodCategory>,
        energy_level: u8,
        valence_level: u8,
        characteristics: MusicCharacteristics,
    ) -> Self {
        let mut similar = Vec::with_capacity(2);
        for candidate in similar_categories {
            if candidate != category && !similar.contains(&candidate) && similar.len() < 2 {
                similar.push(candidate);
            }
        }
        Self {
            category,
            similar_categories: similar,
            energy_level: energy_level.clamp(1, 10),
            valence_level: valence_level.clamp(1, 10),
            characteristics,
            emotions: Vec::new(),
            confidence: None,
            interpretation: None,
        }
    }

    #[must_use]
    pub fn with_notes(
        mut self,
        emotions: Vec<String>,
        confidence: Option<f32>,
        interpretation: Option<String>,
    ) -> Self {
        self.emotions = emotions;
        self.confidence = confidence.map(|value| value.clamp(0.0, 1.0));
        self.interpretation = interpretation;
        self
    }

    #[must_use]
    pub fn category(&self) -> MoodCategory {
        self.category
    }

    #[must_use]
    pub fn similar_categories(&self) -> &[MoodCategory] {
        &self.similar_categories
    }

    #[must_use]
    pub fn energy_level(&self) -> u8 {
        self.energy_level
    }

    #[must_use]
    pub fn valence_level(&self) -> u8 {
        self.valence_level
    }

    /// Energy level rescaled to `[0, 1]`.
    #[must_use]
    pub fn target_energy(&self) -> f32 {
        f32::from(self.energy_level) / 10.0
    }

    /// Valence level rescaled to `[0, 1]`.
    #[must_use]
    pub fn target_valence(&self) -> f32 {
        f32::from(self.valence_level) / 10.0
    }

    #[must_use]
    pub fn characteristics(&self) -> &MusicCharacteristics {
        &self.characteristics
    }

    #[must_use]
    pub fn emotions(&self) -> &[String] {
        &self.emotions
    }

    #[must_use]
    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    #[must_use]
    pub fn interpretation(&self) -> Option<&str> {
        self.interpretation.as_deref()
    }
}

/// Externally supplied score for a single track, already on the 0–100 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackHint {
    pub score: u8,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Hints keyed by track id.
pub type HintMap = HashMap<String, TrackHint>;

/// A track annotated with its match score for the current request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrack {
    pub track: Track,
    pub mood_score: u8,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ScoredTrack {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.track.id
    }
}

/// The ordered, duration-bounded subset returned to callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    pub tracks: Vec<ScoredTrack>,
    pub total_duration_ms: u64,
    pub track_count: usize,
}

impl SelectionResult {
    /// Build a result whose totals are derived from `tracks`.
    #[must_use]
    pub fn from_tracks(tracks: Vec<ScoredTrack>, fallback_duration_ms: u64) -> Self {
        let total_duration_ms = tracks
            .iter()
            .map(|scored| scored.track.effective_duration_ms(fallback_duration_ms))
            .fold(0u64, u64::saturating_add);
        let track_count = tracks.len();
        Self {
            tracks,
            total_duration_ms,
            track_count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in MoodCategory::ALL {
            assert_eq!(category.as_str().parse::<MoodCategory>(), Ok(category));
        }
        assert_eq!(
            "Party Dance".parse::<MoodCategory>(),
            Ok(MoodCategory::PartyDance)
        );
        assert!("polka".parse::<MoodCategory>().is_err());
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&MoodCategory::ChillAmbient).expect("serialize");
        assert_eq!(json, "\"chill_ambient\"");
    }

    #[test]
    fn features_are_clamped_and_nan_dropped() {
        let features = FeatureVector {
            energy: Some(1.4),
            valence: Some(-0.2),
            danceability: Some(f32::NAN),
            ..FeatureVector::default()
        }
        .clamped();

        assert_eq!(features.energy, Some(1.0));
        assert_eq!(features.valence, Some(0.0));
        assert_eq!(features.danceability, None);
    }

    #[test]
    fn resolved_features_use_neutral_defaults() {
        let resolved = FeatureVector::default().resolved();
        assert!((resolved.energy - 0.5).abs() < f32::EPSILON);
        assert!((resolved.acousticness - 0.5).abs() < f32::EPSILON);
        assert!(resolved.instrumentalness.abs() < f32::EPSILON);
    }

    #[test]
    fn profile_normalizes_levels_and_similar_categories() {
        let profile = MoodProfile::new(
            MoodCategory::Romantic,
            [
                MoodCategory::Romantic,
                MoodCategory::CalmPeaceful,
                MoodCategory::CalmPeaceful,
                MoodCategory::Melancholic,
                MoodCategory::ChillAmbient,
            ],
            0,
            42,
            MusicCharacteristics::default(),
        );

        assert_eq!(profile.energy_level(), 1);
        assert_eq!(profile.valence_level(), 10);
        assert_eq!(
            profile.similar_categories(),
            &[MoodCategory::CalmPeaceful, MoodCategory::Melancholic]
        );
    }

    #[test]
    fn artist_key_is_case_insensitive_with_unknown_fallback() {
        let track = Track {
            artist: Some("  The Band ".to_string()),
            ..Track::default()
        };
        assert_eq!(track.artist_key(), "the band");
        assert_eq!(Track::default().artist_key(), "unknown");
    }

    #[test]
    fn selection_totals_use_duration_fallback() {
        let scored = |duration_ms| ScoredTrack {
            track: Track {
                duration_ms,
                ..Track::default()
            },
            mood_score: 50,
            reason: None,
        };
        let result = SelectionResult::from_tracks(vec![scored(Some(1000)), scored(None)], 5000);
        assert_eq!(result.total_duration_ms, 6000);
        assert_eq!(result.track_count, 2);
    }

    #[test]
    fn deserialized_profile_is_normalized() {
        let profile: MoodProfile = serde_json::from_value(serde_json::json!({
            "category": "romantic",
            "similar_categories": ["romantic", "melancholic", "melancholic", "calm_peaceful", "party_dance"],
            "energy_level": 14,
            "valence_level": 0,
            "confidence": 3.0
        }))
        .expect("profile deserializes");

        assert_eq!(profile.energy_level(), 10);
        assert_eq!(profile.valence_level(), 1);
        assert_eq!(
            profile.similar_categories(),
            &[MoodCategory::Melancholic, MoodCategory::CalmPeaceful]
        );
        assert_eq!(profile.confidence(), Some(1.0));
    }
}
