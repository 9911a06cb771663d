//! The curation core: feature filling, classification, scoring, selection
//! and reasons. Everything here is synchronous and infallible; the
//! orchestrator wires it to the async collaborators.

pub mod classify;
pub mod config;
pub mod features;
pub mod orchestrator;
pub mod rationale;
pub mod score;
pub mod select;

pub use orchestrator::{PlaylistAnalysis, RecommendationPipeline, RecommendationReport, RunOptions};
