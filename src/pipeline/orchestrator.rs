use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::classify::{CategoryBreakdown, classify_tracks};
use super::config::EngineConfig;
use super::features::{InferredFeatureMap, apply_inferred, fill_missing_features};
use super::rationale::{DefaultRationaleGenerator, RationaleGenerator, annotate};
use super::score::score_tracks;
use super::select::{DurationSelector, KeepOrder, RandomReshuffle, Reshuffle, SelectionTrace};
use crate::clients::GenerativeClient;
use crate::clients::generative::fallback_description;
use crate::collaborators::{
    FeatureInferrer, KeywordMoodAnalyzer, MoodAnalyzer, NoopFeatureInferrer, NoopTrackRanker,
    RemoteFeatureInferrer, RemoteMoodAnalyzer, RemoteTrackRanker, TrackRanker,
};
use crate::config::Config;
use crate::model::{HintMap, MoodProfile, SelectionResult, Track};
use crate::request::RecommendationRequest;
use crate::util::time::{format_duration, now};

/// Randomness controls for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Seed for feature estimation and reshuffle; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Permute the middle of long selections.
    pub shuffle: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: None,
            shuffle: true,
        }
    }
}

impl RunOptions {
    /// Fully reproducible: fixed seed and no reshuffle.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            shuffle: false,
        }
    }
}

/// Output of the synchronous core for one request.
#[derive(Debug, Clone)]
pub struct Curation {
    pub selection: SelectionResult,
    pub trace: SelectionTrace,
    pub breakdown: CategoryBreakdown,
}

/// Classified tracks of a playlist and their distribution.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistAnalysis {
    pub tracks: Vec<Track>,
    pub breakdown: CategoryBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub mood_input: String,
    pub mood: MoodProfile,
    pub description: String,
    pub requested_duration_ms: u64,
    pub requested_duration: String,
    pub total_duration: String,
    pub candidate_count: usize,
    pub hinted_tracks: usize,
    pub fill_pass_used: bool,
    pub category_breakdown: CategoryBreakdown,
    pub selection: SelectionResult,
}

/// End-to-end recommendation: collaborators first, then the pure core.
pub struct RecommendationPipeline {
    analyzer: Arc<dyn MoodAnalyzer>,
    ranker: Arc<dyn TrackRanker>,
    inferrer: Arc<dyn FeatureInferrer>,
    rationale: Arc<dyn RationaleGenerator>,
    describer: Option<Arc<GenerativeClient>>,
    selector: DurationSelector,
}

impl RecommendationPipeline {
    /// Pipeline that never leaves the process.
    #[must_use]
    pub fn local(engine: EngineConfig) -> Self {
        Self {
            analyzer: Arc::new(KeywordMoodAnalyzer),
            ranker: Arc::new(NoopTrackRanker),
            inferrer: Arc::new(NoopFeatureInferrer),
            rationale: Arc::new(DefaultRationaleGenerator),
            describer: None,
            selector: DurationSelector::new(engine),
        }
    }

    /// Remote-first collaborators when an API key is configured, local ones otherwise.
    ///
    /// # Errors
    /// Fails when the generative client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pipeline = Self::local(config.engine().clone());
        let Some(llm) = config.llm() else {
            info!("no LLM configured, using local collaborators");
            return Ok(pipeline);
        };

        let client = Arc::new(GenerativeClient::new(llm, config.retry_config())?);
        info!(model = client.model(), "using remote-first collaborators");
        Ok(pipeline
            .with_analyzer(Arc::new(RemoteMoodAnalyzer::new(Arc::clone(&client))))
            .with_ranker(Arc::new(RemoteTrackRanker::new(
                Arc::clone(&client),
                config.rank_sample_size(),
            )))
            .with_inferrer(Arc::new(RemoteFeatureInferrer::new(
                Arc::clone(&client),
                config.feature_sample_size(),
            )))
            .with_describer(client))
    }

    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn MoodAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    #[must_use]
    pub fn with_ranker(mut self, ranker: Arc<dyn TrackRanker>) -> Self {
        self.ranker = ranker;
        self
    }

    #[must_use]
    pub fn with_inferrer(mut self, inferrer: Arc<dyn FeatureInferrer>) -> Self {
        self.inferrer = inferrer;
        self
    }

    #[must_use]
    pub fn with_rationale(mut self, rationale: Arc<dyn RationaleGenerator>) -> Self {
        self.rationale = rationale;
        self
    }

    #[must_use]
    pub fn with_describer(mut self, client: Arc<GenerativeClient>) -> Self {
        self.describer = Some(client);
        self
    }

    #[must_use]
    pub fn engine(&self) -> &EngineConfig {
        self.selector.config()
    }

    /// Run the synchronous core: fill features, classify, score, select and
    /// explain.
    #[allow(clippy::too_many_arguments)]
    pub fn curate<R: Rng + ?Sized>(
        &self,
        tracks: Vec<Track>,
        profile: &MoodProfile,
        inferred: Option<&InferredFeatureMap>,
        hints: Option<&HintMap>,
        target_ms: u64,
        rng: &mut R,
        reshuffle: &mut dyn Reshuffle,
    ) -> Curation {
        let filled = fill_missing_features(tracks, inferred, rng);
        let classified = classify_tracks(filled, &self.engine().classifier);
        let breakdown = CategoryBreakdown::from_tracks(&classified);
        let scored = score_tracks(classified, profile, hints);

        let (mut selection, trace) = self.selector.select_with_trace(scored, target_ms, reshuffle);
        annotate(self.rationale.as_ref(), &mut selection.tracks, profile.category());

        Curation {
            selection,
            trace,
            breakdown,
        }
    }

    /// Recommend a duration-bounded playlist for `request` from `tracks`.
    /// Collaborator failures degrade to local behaviour; this never fails.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
        tracks: Vec<Track>,
        options: RunOptions,
    ) -> RecommendationReport {
        let mood_input = request.mood();
        let target_ms = request.target_duration_ms();
        let candidate_count = tracks.len();

        let profile = self.analyzer.analyze(mood_input).await;
        let inferred = self.inferrer.infer(&tracks).await;
        let hints = self.ranker.rank(&tracks, &profile, mood_input).await;

        info!(
            category = %profile.category(),
            energy = profile.energy_level(),
            valence = profile.valence_level(),
            candidates = candidate_count,
            inferred = inferred.as_ref().map_or(0, InferredFeatureMap::len),
            hinted = hints.as_ref().map_or(0, HintMap::len),
            "collaborators finished"
        );

        let curation = {
            let mut rng = match options.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            let mut random = RandomReshuffle::new(StdRng::seed_from_u64(rng.random()));
            let mut keep = KeepOrder;
            let reshuffle: &mut dyn Reshuffle = if options.shuffle { &mut random } else { &mut keep };
            self.curate(
                tracks,
                &profile,
                inferred.as_ref(),
                hints.as_ref(),
                target_ms,
                &mut rng,
                reshuffle,
            )
        };

        let selection = curation.selection;
        let description = self
            .describe(mood_input, selection.track_count, selection.total_duration_ms)
            .await;

        info!(
            target_ms,
            total_ms = selection.total_duration_ms,
            track_count = selection.track_count,
            "recommendation completed"
        );

        RecommendationReport {
            request_id: Uuid::new_v4(),
            generated_at: now(),
            mood_input: mood_input.to_string(),
            mood: profile,
            description,
            requested_duration_ms: target_ms,
            requested_duration: format_duration(target_ms),
            total_duration: format_duration(selection.total_duration_ms),
            candidate_count,
            hinted_tracks: hints.as_ref().map_or(0, HintMap::len),
            fill_pass_used: curation.trace.fill_pass_used,
            category_breakdown: curation.breakdown,
            selection,
        }
    }

    async fn describe(&self, mood: &str, track_count: usize, total_ms: u64) -> String {
        let Some(client) = &self.describer else {
            return fallback_description(mood);
        };
        match client.describe_playlist(mood, track_count, total_ms).await {
            Ok(description) => description,
            Err(error) => {
                warn!(error = ?error, "playlist description failed, using fallback");
                fallback_description(mood)
            }
        }
    }

    /// Classify a playlist without estimating features: tracks with neither
    /// provided nor inferred features stay unclassified.
    pub async fn analyze_playlist(&self, tracks: Vec<Track>) -> PlaylistAnalysis {
        let inferred = self.inferrer.infer(&tracks).await;
        let with_features = apply_inferred(tracks, inferred.as_ref());
        let classified = classify_tracks(with_features, &self.engine().classifier);
        let breakdown = CategoryBreakdown::from_tracks(&classified);
        info!(
            classified = breakdown.classified(),
            unclassified = breakdown.unclassified,
            "playlist analysis completed"
        );
        PlaylistAnalysis {
            tracks: classified,
            breakdown,
        }
    }
}
