use serde::{Deserialize, Serialize};

const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

/// Truncate an upstream error body so that it stays readable in logs.
pub(crate) fn truncate_error_message(msg: &str) -> String {
    let char_count = msg.chars().count();
    if char_count <= MAX_ERROR_MESSAGE_LENGTH {
        return msg.to_string();
    }
    let truncated: String = msg.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
    format!("{truncated}... (truncated, {char_count} chars)")
}

/// Sampling parameters for one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Structured mood analysis.
    pub const ANALYSIS: Self = Self {
        temperature: 0.4,
        top_p: Some(0.95),
        top_k: Some(40),
        max_output_tokens: 1024,
    };

    /// Per-track ranking and feature inference.
    pub const TRACK_JUDGEMENT: Self = Self {
        temperature: 0.3,
        top_p: Some(0.9),
        top_k: None,
        max_output_tokens: 4096,
    };

    /// Short creative copy.
    pub const DESCRIPTION: Self = Self {
        temperature: 0.7,
        top_p: None,
        top_k: None,
        max_output_tokens: 100,
    };
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest<'a> {
    pub(crate) contents: [Content<'a>; 1],
    pub(crate) generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    pub(crate) fn new(prompt: &'a str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    pub(crate) parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct Part<'a> {
    pub(crate) text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub(crate) parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub(crate) text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub(crate) fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}
