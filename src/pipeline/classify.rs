//! Rule-cascade mood classification.

use serde::Serialize;
use tracing::debug;

use super::config::ClassifierThresholds;
use crate::model::{FeatureVector, MoodCategory, Track};

/// Tracks sampled per category in a playlist breakdown.
const BREAKDOWN_SAMPLE: usize = 5;

/// Assign exactly one category. The first matching rule wins; rule order is
/// part of the contract.
#[must_use]
pub fn classify(features: &FeatureVector, thresholds: &ClassifierThresholds) -> MoodCategory {
    let f = features.resolved();
    let t = thresholds;

    if f.valence > t.high && f.energy > t.high {
        MoodCategory::HappyEnergetic
    } else if f.energy < t.low && f.valence > t.low && f.valence < t.high {
        MoodCategory::CalmPeaceful
    } else if f.valence < t.low && f.energy < t.melancholic_energy_ceiling {
        MoodCategory::Melancholic
    } else if f.danceability > t.high && f.energy > t.high {
        MoodCategory::PartyDance
    } else if f.valence > t.mid && f.energy < t.mid && f.acousticness > t.texture_floor {
        MoodCategory::Romantic
    } else if f.energy > t.high && f.valence > t.mid {
        MoodCategory::Motivational
    } else if f.energy < t.ambient_energy_ceiling && f.instrumentalness > t.texture_floor {
        MoodCategory::ChillAmbient
    } else if f.energy > t.very_high_energy && f.valence < t.low {
        MoodCategory::IntenseAggressive
    } else {
        MoodCategory::CalmPeaceful
    }
}

/// Return the tracks with their category recomputed. Tracks without features
/// come back with no category.
#[must_use]
pub fn classify_tracks(tracks: Vec<Track>, thresholds: &ClassifierThresholds) -> Vec<Track> {
    tracks
        .into_iter()
        .map(|track| {
            let category = track
                .features
                .as_ref()
                .map(|features| classify(features, thresholds));
            track.with_category(category)
        })
        .collect()
}

/// Count and sample of one category within a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBucket {
    pub category: MoodCategory,
    pub count: usize,
    pub sample_track_ids: Vec<String>,
}

/// Per-category distribution of a classified playlist, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub buckets: Vec<CategoryBucket>,
    /// Tracks left out because they carried no features.
    pub unclassified: usize,
}

impl CategoryBreakdown {
    #[must_use]
    pub fn from_tracks(tracks: &[Track]) -> Self {
        let mut buckets: Vec<CategoryBucket> = MoodCategory::ALL
            .into_iter()
            .map(|category| CategoryBucket {
                category,
                count: 0,
                sample_track_ids: Vec::new(),
            })
            .collect();
        let mut unclassified = 0;

        for track in tracks {
            let Some(category) = track.category.filter(|_| track.features.is_some()) else {
                unclassified += 1;
                continue;
            };
            if let Some(bucket) = buckets.iter_mut().find(|b| b.category == category) {
                bucket.count += 1;
                if bucket.sample_track_ids.len() < BREAKDOWN_SAMPLE {
                    bucket.sample_track_ids.push(track.id.clone());
                }
            }
        }

        debug!(unclassified, "built category breakdown");
        Self {
            buckets,
            unclassified,
        }
    }

    #[must_use]
    pub fn count(&self, category: MoodCategory) -> usize {
        self.buckets
            .iter()
            .find(|bucket| bucket.category == category)
            .map_or(0, |bucket| bucket.count)
    }

    #[must_use]
    pub fn classified(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }
}
