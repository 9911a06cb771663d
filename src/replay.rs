use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::model::Track;
use crate::pipeline::config::EngineConfig;
use crate::pipeline::{RecommendationPipeline, RecommendationReport, RunOptions};
use crate::request::RecommendationRequest;

/// Configuration required by the offline replay helper.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub dataset: PathBuf,
    pub mood: String,
    pub minutes: u32,
    pub seed: Option<u64>,
    pub shuffle: bool,
    pub remote: bool,
}

/// Read one JSON track per line. Blank lines are skipped.
///
/// # Errors
/// Fails when the file cannot be read or a line is not a valid track.
pub fn load_tracks(path: &Path) -> Result<Vec<Track>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open dataset at {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut tracks = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("failed to read dataset line")?;
        if line.trim().is_empty() {
            continue;
        }
        let track: Track = serde_json::from_str(&line)
            .with_context(|| format!("failed to parse track on line {}", idx + 1))?;
        tracks.push(track);
    }
    Ok(tracks)
}

/// Run one recommendation over a dataset dump.
///
/// # Errors
/// Fails on invalid request input, unreadable datasets, or, with `remote`,
/// missing LLM configuration.
pub async fn replay_recommendation(config: ReplayConfig) -> Result<RecommendationReport> {
    let request = RecommendationRequest::new(&config.mood, config.minutes)?;
    let tracks = load_tracks(&config.dataset)?;
    info!(
        dataset = %config.dataset.display(),
        tracks = tracks.len(),
        remote = config.remote,
        "replaying recommendation"
    );

    let pipeline = if config.remote {
        let app_config = Config::from_env()?;
        app_config.require_llm()?;
        RecommendationPipeline::from_config(&app_config)?
    } else {
        RecommendationPipeline::local(EngineConfig::from_env())
    };

    let options = RunOptions {
        seed: config.seed,
        shuffle: config.shuffle,
    };
    Ok(pipeline.recommend(&request, tracks, options).await)
}
