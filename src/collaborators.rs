//! External collaborators of the curation core.
//!
//! Each collaborator is a trait with a local implementation that always
//! works and a remote-first implementation backed by the generative client.
//! Remote implementations never surface errors: mood analysis degrades to
//! keyword matching, and the per-track collaborators degrade to `None`.

mod keyword;
mod remote;

use async_trait::async_trait;

pub use keyword::KeywordMoodAnalyzer;
pub use remote::{RemoteFeatureInferrer, RemoteMoodAnalyzer, RemoteTrackRanker};

use crate::model::{HintMap, MoodProfile, Track};
use crate::pipeline::features::InferredFeatureMap;

/// Turns free-text mood into a [`MoodProfile`].
#[async_trait]
pub trait MoodAnalyzer: Send + Sync {
    async fn analyze(&self, mood_text: &str) -> MoodProfile;
}

/// Produces per-track score hints for a request.
#[async_trait]
pub trait TrackRanker: Send + Sync {
    async fn rank(&self, tracks: &[Track], profile: &MoodProfile, mood_text: &str) -> Option<HintMap>;
}

/// Guesses features for tracks that arrive without any.
#[async_trait]
pub trait FeatureInferrer: Send + Sync {
    async fn infer(&self, tracks: &[Track]) -> Option<InferredFeatureMap>;
}

/// Ranker that never supplies hints; every track is scored by formula.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrackRanker;

#[async_trait]
impl TrackRanker for NoopTrackRanker {
    async fn rank(&self, _tracks: &[Track], _profile: &MoodProfile, _mood_text: &str) -> Option<HintMap> {
        None
    }
}

/// Inferrer that never guesses; featureless tracks fall through to estimation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeatureInferrer;

#[async_trait]
impl FeatureInferrer for NoopFeatureInferrer {
    async fn infer(&self, _tracks: &[Track]) -> Option<InferredFeatureMap> {
        None
    }
}
