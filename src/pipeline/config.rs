//! Tunables for classification, scoring and selection.
//!
//! Every value has a canonical default; `from_env` lets an operator override
//! them without a rebuild. Unparsable overrides are ignored with a warning so
//! the engine itself never fails on configuration.

use std::env;
use std::str::FromStr;

use crate::model::DEFAULT_TRACK_DURATION_MS;

/// Cut-offs of the category decision cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierThresholds {
    /// Above this a dimension counts as "high" (0.7).
    pub high: f32,
    /// Energy floor for `intense_aggressive` (0.8).
    pub very_high_energy: f32,
    /// Below this a dimension counts as "low" (0.4).
    pub low: f32,
    /// Neutral midpoint used by the romantic and motivational rules (0.5).
    pub mid: f32,
    /// Energy ceiling for `melancholic` (0.6).
    pub melancholic_energy_ceiling: f32,
    /// Energy ceiling for `chill_ambient` (0.3).
    pub ambient_energy_ceiling: f32,
    /// Acousticness / instrumentalness floor (0.3).
    pub texture_floor: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            very_high_energy: 0.8,
            low: 0.4,
            mid: 0.5,
            melancholic_energy_ceiling: 0.6,
            ambient_energy_ceiling: 0.3,
            texture_floor: 0.3,
        }
    }
}

/// Selection and scoring tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum score for the first selection pass (default: 30).
    pub score_floor: u8,
    /// Per-artist cap during the first pass (default: 2).
    pub artist_cap_primary: usize,
    /// Per-artist cap during the fill pass (default: 3).
    pub artist_cap_fill: usize,
    /// How far past the target the first pass may run (default: 3 minutes).
    pub over_budget_tolerance_ms: u64,
    /// Fill pass runs when the first pass reached less than this share of the target (default: 0.7).
    pub fill_trigger_ratio: f64,
    /// Middle-segment reshuffle applies above this many tracks (default: 8).
    pub reshuffle_threshold: usize,
    /// Tracks pinned at each end during reshuffle (default: 3).
    pub reshuffle_pinned: usize,
    /// Tracks accepted regardless of the over-budget check (default: 3).
    pub min_forced_tracks: usize,
    /// Duration assumed for tracks without one (default: 210000 ms).
    pub default_duration_ms: u64,
    pub classifier: ClassifierThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            score_floor: 30,
            artist_cap_primary: 2,
            artist_cap_fill: 3,
            over_budget_tolerance_ms: 3 * 60 * 1000,
            fill_trigger_ratio: 0.7,
            reshuffle_threshold: 8,
            reshuffle_pinned: 3,
            min_forced_tracks: 3,
            default_duration_ms: DEFAULT_TRACK_DURATION_MS,
            classifier: ClassifierThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Load overrides from `MOOD_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let score_floor: u8 = parse_env("MOOD_SCORE_FLOOR", defaults.score_floor);
        let fill_trigger_ratio: f64 =
            parse_env("MOOD_FILL_TRIGGER_RATIO", defaults.fill_trigger_ratio);

        Self {
            score_floor: score_floor.min(100),
            artist_cap_primary: parse_env("MOOD_ARTIST_CAP_PRIMARY", defaults.artist_cap_primary),
            artist_cap_fill: parse_env("MOOD_ARTIST_CAP_FILL", defaults.artist_cap_fill),
            over_budget_tolerance_ms: parse_env(
                "MOOD_OVER_BUDGET_TOLERANCE_MS",
                defaults.over_budget_tolerance_ms,
            ),
            fill_trigger_ratio: if fill_trigger_ratio.is_finite() {
                fill_trigger_ratio.clamp(0.0, 1.0)
            } else {
                defaults.fill_trigger_ratio
            },
            reshuffle_threshold: parse_env("MOOD_RESHUFFLE_THRESHOLD", defaults.reshuffle_threshold),
            reshuffle_pinned: parse_env("MOOD_RESHUFFLE_PINNED", defaults.reshuffle_pinned),
            min_forced_tracks: parse_env("MOOD_MIN_FORCED_TRACKS", defaults.min_forced_tracks),
            default_duration_ms: parse_env("MOOD_DEFAULT_DURATION_MS", defaults.default_duration_ms),
            classifier: defaults.classifier,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable override");
            default
        }),
        Err(_) => default,
    }
}
