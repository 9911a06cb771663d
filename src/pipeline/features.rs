//! Feature estimation for tracks that arrive without audio features.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{FeatureSource, FeatureVector, Track};

/// Popularity assumed when the source does not report one.
const DEFAULT_POPULARITY: u8 = 50;
/// Half-width of the uniform noise applied to the estimated valence.
pub const VALENCE_NOISE: f32 = 0.1;
const FALLBACK_ACOUSTICNESS: f32 = 0.3;
const FALLBACK_INSTRUMENTALNESS: f32 = 0.1;

/// Features a text-based analyzer guessed for a track, keyed by lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferredFeatures {
    pub energy: f32,
    pub valence: f32,
    pub danceability: f32,
}

pub type InferredFeatureMap = HashMap<String, InferredFeatures>;

/// Best-effort features from popularity and the explicit flag.
///
/// Valence carries no real signal here and is drawn from
/// `0.5 ± VALENCE_NOISE`; that noise band is the precision limit of the
/// estimate.
pub fn estimate<R: Rng + ?Sized>(popularity: Option<u8>, explicit: bool, rng: &mut R) -> FeatureVector {
    let popularity = f32::from(popularity.unwrap_or(DEFAULT_POPULARITY).min(100)) / 100.0;

    let mut energy = 0.5 + 0.2 * popularity;
    if explicit {
        energy += 0.1;
    }
    let valence = 0.5 + rng.random_range(-VALENCE_NOISE..=VALENCE_NOISE);
    let danceability = 0.5 + 0.3 * popularity;

    FeatureVector::complete(
        energy,
        valence,
        danceability,
        FALLBACK_ACOUSTICNESS,
        FALLBACK_INSTRUMENTALNESS,
        FeatureSource::Estimated,
    )
}

/// Give every track a feature vector.
///
/// Provided features are kept (clamped). Otherwise inferred features matched
/// by lowercase track name are used, and the heuristic estimate is the last
/// resort.
pub fn fill_missing_features<R: Rng + ?Sized>(
    tracks: Vec<Track>,
    inferred: Option<&InferredFeatureMap>,
    rng: &mut R,
) -> Vec<Track> {
    let mut provided = 0usize;
    let mut from_inference = 0usize;
    let mut estimated = 0usize;

    let filled: Vec<Track> = tracks
        .into_iter()
        .map(|track| {
            if let Some(features) = track.features {
                provided += 1;
                return track.with_features(features);
            }

            if let Some(features) = lookup_inferred(&track, inferred) {
                from_inference += 1;
                return track.with_features(features);
            }

            estimated += 1;
            let features = estimate(track.popularity, track.explicit, rng);
            track.with_features(features)
        })
        .collect();

    debug!(provided, from_inference, estimated, "filled track features");
    filled
}

/// Attach inferred features where the track has none, without estimating.
/// Provided features are clamped; tracks that stay featureless remain
/// unclassifiable.
#[must_use]
pub fn apply_inferred(tracks: Vec<Track>, inferred: Option<&InferredFeatureMap>) -> Vec<Track> {
    tracks
        .into_iter()
        .map(|track| {
            if let Some(features) = track.features {
                return track.with_features(features);
            }
            match lookup_inferred(&track, inferred) {
                Some(features) => track.with_features(features),
                None => track,
            }
        })
        .collect()
}

fn lookup_inferred(track: &Track, inferred: Option<&InferredFeatureMap>) -> Option<FeatureVector> {
    let guess = inferred?.get(&track.name.trim().to_lowercase())?;
    Some(FeatureVector::complete(
        guess.energy,
        guess.valence,
        guess.danceability,
        FALLBACK_ACOUSTICNESS,
        FALLBACK_INSTRUMENTALNESS,
        FeatureSource::Inferred,
    ))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn track(name: &str) -> Track {
        Track {
            id: name.to_string(),
            name: name.to_string(),
            ..Track::default()
        }
    }

    #[test]
    fn estimate_follows_popularity_formula() {
        let mut rng = StdRng::seed_from_u64(7);
        let features = estimate(Some(100), true, &mut rng);

        assert_eq!(features.source, FeatureSource::Estimated);
        // 0.5 + 0.2 + 0.1
        assert!((features.energy.unwrap() - 0.8).abs() < 1e-6);
        assert!((features.danceability.unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(features.acousticness, Some(0.3));
        assert_eq!(features.instrumentalness, Some(0.1));
    }

    #[test]
    fn estimate_defaults_popularity_and_bounds_valence_noise() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let features = estimate(None, false, &mut rng);
            assert!((features.energy.unwrap() - 0.6).abs() < 1e-6);
            let valence = features.valence.unwrap();
            assert!((0.4 - 1e-6..=0.6 + 1e-6).contains(&valence), "valence {valence}");
        }
    }

    #[test]
    fn fill_prefers_provided_then_inferred_then_estimate() {
        let mut rng = StdRng::seed_from_u64(3);
        let provided = track("Provided").with_features(FeatureVector {
            energy: Some(1.5),
            ..FeatureVector::default()
        });
        let inferred_map = InferredFeatureMap::from([(
            "guessed song".to_string(),
            InferredFeatures {
                energy: 0.9,
                valence: 0.2,
                danceability: 0.4,
            },
        )]);

        let filled = fill_missing_features(
            vec![provided, track("Guessed Song"), track("Unknown")],
            Some(&inferred_map),
            &mut rng,
        );

        let sources: Vec<FeatureSource> = filled
            .iter()
            .map(|t| t.features.expect("features filled").source)
            .collect();
        assert_eq!(
            sources,
            vec![
                FeatureSource::Provided,
                FeatureSource::Inferred,
                FeatureSource::Estimated
            ]
        );
        assert_eq!(filled[0].features.unwrap().energy, Some(1.0));
        assert_eq!(filled[1].features.unwrap().valence, Some(0.2));
    }

    #[test]
    fn apply_inferred_never_estimates() {
        let map = InferredFeatureMap::from([(
            "known".to_string(),
            InferredFeatures {
                energy: 0.2,
                valence: 0.3,
                danceability: 0.4,
            },
        )]);
        let tracks = apply_inferred(vec![track("Known"), track("Unknown")], Some(&map));
        assert_eq!(
            tracks[0].features.map(|f| f.source),
            Some(FeatureSource::Inferred)
        );
        assert!(tracks[1].features.is_none());
        assert!(apply_inferred(vec![track("Known")], None)[0].features.is_none());
    }
}
