use once_cell::sync::Lazy;
use serde_json::{Value, json};

/// Reply of the track-ranking prompt: 1-based indices into the sent sample.
pub static TRACK_RANKING_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Track Ranking",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "index": { "type": "integer", "minimum": 1 },
                "score": { "type": ["number", "null"] },
                "reason": { "type": ["string", "null"] }
            },
            "required": ["index"]
        }
    })
});

/// Reply of the feature-inference prompt, keyed by track name.
pub static FEATURE_INFERENCE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Feature Inference",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "energy": { "type": ["number", "null"] },
                "valence": { "type": ["number", "null"] },
                "danceability": { "type": ["number", "null"] },
                "category": { "type": ["string", "null"] }
            },
            "required": ["name"]
        }
    })
});
