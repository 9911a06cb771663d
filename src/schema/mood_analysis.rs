use once_cell::sync::Lazy;
use serde_json::{Value, json};

/// Reply of the mood-analysis prompt.
pub static MOOD_ANALYSIS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let categories = json!([
        "happy_energetic",
        "calm_peaceful",
        "melancholic",
        "party_dance",
        "romantic",
        "motivational",
        "chill_ambient",
        "intense_aggressive"
    ]);
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Mood Analysis",
        "type": "object",
        "properties": {
            "mood_category": { "type": "string", "enum": categories },
            "energy_level": { "type": "number", "minimum": 0, "maximum": 10 },
            "valence_level": { "type": "number", "minimum": 0, "maximum": 10 },
            "similar_moods": {
                "type": "array",
                "items": { "type": "string" }
            },
            "emotions": {
                "type": "array",
                "items": { "type": "string" }
            },
            "music_characteristics": {
                "type": "object",
                "additionalProperties": { "type": ["string", "null"] }
            },
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
            "interpretation": { "type": "string" }
        },
        "required": ["mood_category", "energy_level", "valence_level"]
    })
});
