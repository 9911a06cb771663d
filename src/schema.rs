//! JSON Schemas for replies from the generative collaborators.
//!
//! Replies are validated before deserialization so that a malformed answer
//! is reported once, with its violations, and the caller can fall back.

pub mod mood_analysis;
pub mod track_analysis;

use serde_json::Value;

/// Outcome of validating one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validate `instance` against `schema_json`. A schema that fails to compile
/// is reported as an invalid result.
#[must_use]
pub fn validate_json(schema_json: &Value, instance: &Value) -> ValidationResult {
    match jsonschema::validator_for(schema_json) {
        Ok(validator) => {
            let errors: Vec<String> = validator
                .iter_errors(instance)
                .map(|error| format!("{error} at {}", error.instance_path))
                .collect();
            if errors.is_empty() {
                ValidationResult::valid()
            } else {
                ValidationResult::invalid(errors)
            }
        }
        Err(e) => ValidationResult::invalid(vec![format!("Schema compilation error: {e}")]),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::mood_analysis::MOOD_ANALYSIS_SCHEMA;
    use super::track_analysis::{FEATURE_INFERENCE_SCHEMA, TRACK_RANKING_SCHEMA};
    use super::*;

    #[test]
    fn accepts_mood_reply() {
        let reply = json!({
            "mood_category": "chill_ambient",
            "energy_level": 2.5,
            "valence_level": 6,
            "similar_moods": ["calm_peaceful"]
        });
        let result = validate_json(&MOOD_ANALYSIS_SCHEMA, &reply);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn reports_every_mood_violation() {
        let reply = json!({ "mood_category": "polka", "energy_level": 14 });
        let result = validate_json(&MOOD_ANALYSIS_SCHEMA, &reply);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn ranking_indices_are_one_based() {
        let result = validate_json(&TRACK_RANKING_SCHEMA, &json!([{ "index": 0, "score": 80 }]));
        assert!(!result.valid);
        assert!(result.errors[0].contains("/0/index"));
    }

    #[test]
    fn inference_requires_names() {
        let ok = json!([{ "name": "Harbor Lights", "energy": 0.4 }]);
        let missing = json!([{ "energy": 0.4 }]);
        assert!(validate_json(&FEATURE_INFERENCE_SCHEMA, &ok).valid);
        assert!(!validate_json(&FEATURE_INFERENCE_SCHEMA, &missing).valid);
    }

    #[test]
    fn broken_schema_is_invalid() {
        let schema = json!({ "type": "not-a-type" });
        let result = validate_json(&schema, &json!({}));
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("Schema compilation error"));
    }
}
