//! Validation of user input before it reaches the curation core.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

pub const MIN_DURATION_MINUTES: u32 = 5;
pub const MAX_DURATION_MINUTES: u32 = 480;
pub const MAX_MOOD_CHARS: usize = 500;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static PLAYLIST_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(open\.)?spotify\.com/playlist/([a-zA-Z0-9]+)")
        .expect("valid playlist url pattern")
});
static PLAYLIST_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^spotify:playlist:([a-zA-Z0-9]+)$").expect("valid playlist uri pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("mood description is empty")]
    EmptyMood,
    #[error("mood description is {0} characters, at most {MAX_MOOD_CHARS} allowed")]
    MoodTooLong(usize),
    #[error("duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes, got {0}")]
    DurationOutOfRange(u32),
    #[error("not a playlist reference: {0}")]
    InvalidPlaylistRef(String),
}

/// Strip markup and surrounding whitespace from free text.
#[must_use]
pub fn sanitize_mood(raw: &str) -> String {
    HTML_TAG.replace_all(raw, "").trim().to_string()
}

/// A validated recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRequest {
    mood: String,
    duration_minutes: u32,
}

impl RecommendationRequest {
    /// # Errors
    /// Rejects empty or oversized mood text (after sanitizing) and durations
    /// outside 5–480 minutes.
    pub fn new(mood: &str, duration_minutes: u32) -> Result<Self, RequestError> {
        let mood = sanitize_mood(mood);
        let length = mood.chars().count();
        if length == 0 {
            return Err(RequestError::EmptyMood);
        }
        if length > MAX_MOOD_CHARS {
            return Err(RequestError::MoodTooLong(length));
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(RequestError::DurationOutOfRange(duration_minutes));
        }
        Ok(Self {
            mood,
            duration_minutes,
        })
    }

    #[must_use]
    pub fn mood(&self) -> &str {
        &self.mood
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn target_duration_ms(&self) -> u64 {
        u64::from(self.duration_minutes) * 60_000
    }
}

/// Identifier of a source playlist, parsed from a share URL or a URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistRef {
    id: String,
}

impl PlaylistRef {
    /// # Errors
    /// Returns [`RequestError::InvalidPlaylistRef`] for anything that is not a
    /// playlist URL or `spotify:playlist:` URI.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let trimmed = raw.trim();
        PLAYLIST_URL
            .captures(trimmed)
            .or_else(|| PLAYLIST_URI.captures(trimmed))
            .and_then(|captures| captures.iter().skip(1).flatten().last())
            .map(|id| Self {
                id: id.as_str().to_string(),
            })
            .ok_or_else(|| RequestError::InvalidPlaylistRef(trimmed.to_string()))
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}
