//! Remote-first collaborators backed by the generative client.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{FeatureInferrer, KeywordMoodAnalyzer, MoodAnalyzer, TrackRanker};
use crate::clients::GenerativeClient;
use crate::clients::generative::GenerationConfig;
use crate::model::{HintMap, MoodCategory, MoodProfile, MusicCharacteristics, Track, TrackHint};
use crate::pipeline::features::{InferredFeatureMap, InferredFeatures};
use crate::schema::mood_analysis::MOOD_ANALYSIS_SCHEMA;
use crate::schema::track_analysis::{FEATURE_INFERENCE_SCHEMA, TRACK_RANKING_SCHEMA};
use crate::schema::validate_json;
use crate::util::json::extract_outer_value;

const DEFAULT_HINT_SCORE: f64 = 50.0;
const DEFAULT_HINT_REASON: &str = "Matches mood";
const NEUTRAL_FEATURE: f32 = 0.5;

fn validated(raw: &str, schema: &Value, what: &str) -> Result<Value> {
    let value = extract_outer_value(raw).with_context(|| format!("{what} reply is not JSON"))?;
    let validation = validate_json(schema, &value);
    if !validation.valid {
        return Err(anyhow!("{what} reply failed validation: {:?}", validation.errors));
    }
    Ok(value)
}

fn track_line(track: &Track) -> String {
    format!(
        "\"{}\" by {}",
        track.name,
        track.artist.as_deref().unwrap_or("Unknown Artist")
    )
}

/// Mood analysis through the generative API, with keyword matching as the
/// fallback for any failure.
pub struct RemoteMoodAnalyzer {
    client: Arc<GenerativeClient>,
    fallback: KeywordMoodAnalyzer,
}

#[derive(Debug, Deserialize)]
struct MoodAnalysisReply {
    mood_category: MoodCategory,
    energy_level: f64,
    valence_level: f64,
    #[serde(default)]
    similar_moods: Vec<String>,
    #[serde(default)]
    emotions: Vec<String>,
    #[serde(default)]
    music_characteristics: Option<MusicCharacteristics>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    interpretation: Option<String>,
}

impl MoodAnalysisReply {
    fn into_profile(self) -> MoodProfile {
        let mut similar: Vec<MoodCategory> = self
            .similar_moods
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .filter(|category| *category != self.mood_category)
            .collect();
        if similar.is_empty() {
            similar.extend(self.mood_category.neighbours());
        }

        MoodProfile::new(
            self.mood_category,
            similar,
            level(self.energy_level),
            level(self.valence_level),
            self.music_characteristics.unwrap_or_default(),
        )
        .with_notes(self.emotions, self.confidence, self.interpretation)
    }
}

/// Round a 1-10 level reported as a JSON number.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn level(raw: f64) -> u8 {
    if raw.is_finite() {
        raw.round().clamp(1.0, 10.0) as u8
    } else {
        5
    }
}

impl RemoteMoodAnalyzer {
    #[must_use]
    pub fn new(client: Arc<GenerativeClient>) -> Self {
        Self {
            client,
            fallback: KeywordMoodAnalyzer,
        }
    }

    async fn analyze_remote(&self, mood_text: &str) -> Result<MoodProfile> {
        let prompt = mood_prompt(mood_text);
        let raw = self.client.generate(&prompt, GenerationConfig::ANALYSIS).await?;
        let value = validated(&raw, &MOOD_ANALYSIS_SCHEMA, "mood analysis")?;
        let reply: MoodAnalysisReply =
            serde_json::from_value(value).context("failed to deserialize mood analysis")?;
        Ok(reply.into_profile())
    }
}

fn mood_prompt(mood_text: &str) -> String {
    let categories: Vec<&str> = MoodCategory::ALL.iter().map(|c| c.as_str()).collect();
    format!(
        "You are a music psychologist and DJ. Translate the listener's mood description into \
         musical parameters, considering explicit emotions, implied activity and compound moods.\n\n\
         Mood description: \"{mood_text}\"\n\n\
         Choose mood_category from: {categories}.\n\
         Respond ONLY with JSON in this shape:\n\
         {{\"emotions\": [\"primary\", \"secondary\"], \"energy_level\": 1-10, \"valence_level\": 1-10, \
         \"music_characteristics\": {{\"tempo_preference\": \"slow|medium|fast\", \
         \"energy_preference\": \"...\", \"danceability_preference\": \"...\", \
         \"acousticness_preference\": \"...\", \"instrumentalness_preference\": \"...\"}}, \
         \"mood_category\": \"...\", \"similar_moods\": [\"...\", \"...\"], \
         \"confidence\": 0.0-1.0, \"interpretation\": \"...\"}}",
        categories = categories.join(", ")
    )
}

#[async_trait]
impl MoodAnalyzer for RemoteMoodAnalyzer {
    async fn analyze(&self, mood_text: &str) -> MoodProfile {
        match self.analyze_remote(mood_text).await {
            Ok(profile) => {
                info!(
                    category = %profile.category(),
                    energy = profile.energy_level(),
                    valence = profile.valence_level(),
                    "remote mood analysis succeeded"
                );
                profile
            }
            Err(error) => {
                warn!(error = ?error, "remote mood analysis failed, falling back to keywords");
                self.fallback.profile_for(mood_text)
            }
        }
    }
}

/// Per-track score hints for the first `sample_size` tracks.
pub struct RemoteTrackRanker {
    client: Arc<GenerativeClient>,
    sample_size: usize,
}

#[derive(Debug, Deserialize)]
struct RankingItem {
    index: usize,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    reason: Option<String>,
}

impl RemoteTrackRanker {
    #[must_use]
    pub fn new(client: Arc<GenerativeClient>, sample_size: usize) -> Self {
        Self {
            client,
            sample_size: sample_size.max(1),
        }
    }

    async fn rank_remote(&self, sample: &[Track], profile: &MoodProfile, mood_text: &str) -> Result<HintMap> {
        let mut track_list = String::new();
        for (i, track) in sample.iter().enumerate() {
            let _ = writeln!(track_list, "{}. {}", i + 1, track_line(track));
        }
        let prompt = format!(
            "You are a music curator building a personalized playlist.\n\n\
             Listener mood: \"{mood_text}\"\n\
             Detected category: {category}\n\
             Target energy: {energy}/10\n\
             Target valence: {valence}/10\n\n\
             Tracks:\n{track_list}\n\
             Score every track from 0 to 100 for how well it fits the mood \
             (90+ perfect, 70-89 great, 50-69 decent, 30-49 weak, below 30 poor), \
             judging by title, artist style and known emotional associations.\n\
             Respond ONLY with a JSON array: [{{\"index\": 1, \"score\": 85, \"reason\": \"brief reason\"}}, ...]",
            category = profile.category(),
            energy = profile.energy_level(),
            valence = profile.valence_level(),
        );

        let raw = self
            .client
            .generate(&prompt, GenerationConfig::TRACK_JUDGEMENT)
            .await?;
        let value = validated(&raw, &TRACK_RANKING_SCHEMA, "track ranking")?;
        let items: Vec<RankingItem> =
            serde_json::from_value(value).context("failed to deserialize track ranking")?;
        Ok(hints_from_ranking(sample, items))
    }
}

/// Map 1-based ranking indices back to track ids. Unknown indices are dropped.
fn hints_from_ranking(sample: &[Track], items: Vec<RankingItem>) -> HintMap {
    let mut hints = HintMap::new();
    for item in items {
        let Some(track) = item.index.checked_sub(1).and_then(|i| sample.get(i)) else {
            debug!(index = item.index, "ranking referenced an unknown track index");
            continue;
        };
        let reason = item
            .reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| DEFAULT_HINT_REASON.to_string());
        hints.insert(
            track.id.clone(),
            TrackHint {
                score: hint_score(item.score),
                reason: Some(reason),
            },
        );
    }
    hints
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hint_score(raw: Option<f64>) -> u8 {
    let score = raw.filter(|score| score.is_finite()).unwrap_or(DEFAULT_HINT_SCORE);
    score.round().clamp(0.0, 100.0) as u8
}

#[async_trait]
impl TrackRanker for RemoteTrackRanker {
    async fn rank(&self, tracks: &[Track], profile: &MoodProfile, mood_text: &str) -> Option<HintMap> {
        if tracks.is_empty() {
            return None;
        }
        let sample = &tracks[..tracks.len().min(self.sample_size)];
        match self.rank_remote(sample, profile, mood_text).await {
            Ok(hints) if !hints.is_empty() => {
                info!(sampled = sample.len(), hinted = hints.len(), "remote track ranking succeeded");
                Some(hints)
            }
            Ok(_) => {
                warn!("remote track ranking returned no usable entries");
                None
            }
            Err(error) => {
                warn!(error = ?error, "remote track ranking failed, scoring by formula");
                None
            }
        }
    }
}

/// Feature guesses for the first `sample_size` tracks, keyed by lowercase name.
pub struct RemoteFeatureInferrer {
    client: Arc<GenerativeClient>,
    sample_size: usize,
}

#[derive(Debug, Deserialize)]
struct InferenceItem {
    name: String,
    #[serde(default)]
    energy: Option<f32>,
    #[serde(default)]
    valence: Option<f32>,
    #[serde(default)]
    danceability: Option<f32>,
}

/// Missing or zero dimensions are treated as unknown.
fn dimension(raw: Option<f32>) -> f32 {
    raw.filter(|value| value.is_finite() && *value != 0.0)
        .map_or(NEUTRAL_FEATURE, |value| value.clamp(0.0, 1.0))
}

impl RemoteFeatureInferrer {
    #[must_use]
    pub fn new(client: Arc<GenerativeClient>, sample_size: usize) -> Self {
        Self {
            client,
            sample_size: sample_size.max(1),
        }
    }

    async fn infer_remote(&self, sample: &[Track]) -> Result<InferredFeatureMap> {
        let track_list: Vec<String> = sample.iter().map(track_line).collect();
        let prompt = format!(
            "You are a music expert. Estimate the emotional character of these songs from \
             what you know about the artist, the genre and the song itself.\n\n\
             Songs:\n{songs}\n\n\
             For each song give energy, valence and danceability between 0.0 and 1.0.\n\
             Respond ONLY with a JSON array: \
             [{{\"name\": \"exact song name\", \"energy\": 0.7, \"valence\": 0.8, \"danceability\": 0.6}}, ...]",
            songs = track_list.join("\n")
        );

        let raw = self
            .client
            .generate(&prompt, GenerationConfig::TRACK_JUDGEMENT)
            .await?;
        let value = validated(&raw, &FEATURE_INFERENCE_SCHEMA, "feature inference")?;
        let items: Vec<InferenceItem> =
            serde_json::from_value(value).context("failed to deserialize feature inference")?;

        Ok(items
            .into_iter()
            .map(|item| {
                (
                    item.name.trim().to_lowercase(),
                    InferredFeatures {
                        energy: dimension(item.energy),
                        valence: dimension(item.valence),
                        danceability: dimension(item.danceability),
                    },
                )
            })
            .collect())
    }
}

#[async_trait]
impl FeatureInferrer for RemoteFeatureInferrer {
    async fn infer(&self, tracks: &[Track]) -> Option<InferredFeatureMap> {
        let missing: Vec<Track> = tracks
            .iter()
            .filter(|track| track.features.is_none())
            .take(self.sample_size)
            .cloned()
            .collect();
        if missing.is_empty() {
            return None;
        }

        match self.infer_remote(&missing).await {
            Ok(map) if !map.is_empty() => {
                info!(sampled = missing.len(), inferred = map.len(), "remote feature inference succeeded");
                Some(map)
            }
            Ok(_) => None,
            Err(error) => {
                warn!(error = ?error, "remote feature inference failed, estimating instead");
                None
            }
        }
    }
}
