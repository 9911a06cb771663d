//! Local mood analysis by keyword counting.

use async_trait::async_trait;

use super::MoodAnalyzer;
use crate::model::{MoodCategory, MoodProfile, MusicCharacteristics};

/// Confidence reported for every keyword-derived profile.
const KEYWORD_CONFIDENCE: f32 = 0.5;

/// Deterministic analyzer used offline and as the remote fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordMoodAnalyzer;

struct CategoryDefaults {
    energy: u8,
    valence: u8,
    tempo: &'static str,
    danceability: &'static str,
}

fn keywords(category: MoodCategory) -> &'static [&'static str] {
    match category {
        MoodCategory::HappyEnergetic => &[
            "happy", "excited", "joy", "celebrate", "pumped", "great", "amazing", "awesome",
            "fantastic",
        ],
        MoodCategory::CalmPeaceful => &[
            "calm", "peaceful", "relax", "chill", "unwind", "serene", "tranquil", "zen",
            "meditate",
        ],
        MoodCategory::Melancholic => &[
            "sad", "down", "depressed", "lonely", "miss", "heartbreak", "breakup", "cry", "grief",
            "nostalgic",
        ],
        MoodCategory::PartyDance => &[
            "party", "dance", "club", "fun", "weekend", "celebrate", "groove", "night out",
        ],
        MoodCategory::Romantic => &[
            "love", "romantic", "crush", "date", "tender", "intimate", "passion", "sensual",
        ],
        MoodCategory::Motivational => &[
            "motivated", "workout", "gym", "run", "focus", "work", "study", "productive", "grind",
            "hustle",
        ],
        MoodCategory::ChillAmbient => &[
            "background", "ambient", "sleep", "rest", "quiet", "lo-fi", "lofi", "concentrate",
        ],
        MoodCategory::IntenseAggressive => &[
            "angry", "rage", "intense", "heavy", "frustrated", "metal", "hard", "aggressive",
        ],
    }
}

fn defaults(category: MoodCategory) -> CategoryDefaults {
    let (energy, valence, tempo, danceability) = match category {
        MoodCategory::HappyEnergetic => (8, 9, "fast", "high"),
        MoodCategory::CalmPeaceful => (3, 6, "slow", "low"),
        MoodCategory::Melancholic => (3, 2, "slow", "low"),
        MoodCategory::PartyDance => (9, 8, "fast", "high"),
        MoodCategory::Romantic => (4, 7, "slow", "low"),
        MoodCategory::Motivational => (8, 7, "fast", "medium"),
        MoodCategory::ChillAmbient => (2, 5, "slow", "low"),
        MoodCategory::IntenseAggressive => (9, 3, "fast", "medium"),
    };
    CategoryDefaults {
        energy,
        valence,
        tempo,
        danceability,
    }
}

/// Category with the strictly highest substring match count. Ties keep the
/// earlier category; no match at all yields `calm_peaceful`.
#[must_use]
pub fn detect_category(mood_text: &str) -> MoodCategory {
    let lowered = mood_text.to_lowercase();
    let mut detected = MoodCategory::CalmPeaceful;
    let mut best = 0usize;

    for category in MoodCategory::ALL {
        let matches = keywords(category)
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count();
        if matches > best {
            best = matches;
            detected = category;
        }
    }
    detected
}

impl KeywordMoodAnalyzer {
    #[must_use]
    pub fn profile_for(&self, mood_text: &str) -> MoodProfile {
        let category = detect_category(mood_text);
        let d = defaults(category);
        let level = |high: bool| (if high { "high" } else { "low" }).to_string();

        let characteristics = MusicCharacteristics {
            tempo_preference: Some(d.tempo.to_string()),
            energy_preference: Some(level(d.energy > 6)),
            danceability_preference: Some(d.danceability.to_string()),
            acousticness_preference: Some(level(d.energy < 5)),
            instrumentalness_preference: Some(level(category == MoodCategory::ChillAmbient)),
        };

        MoodProfile::new(category, category.neighbours(), d.energy, d.valence, characteristics)
            .with_notes(
                vec![category.label()],
                Some(KEYWORD_CONFIDENCE),
                Some(format!("Detected {} mood from keywords", category.label())),
            )
    }
}

#[async_trait]
impl MoodAnalyzer for KeywordMoodAnalyzer {
    async fn analyze(&self, mood_text: &str) -> MoodProfile {
        self.profile_for(mood_text)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("feeling so HAPPY and excited today", MoodCategory::HappyEnergetic)]
    #[case("need to focus and study for exams", MoodCategory::Motivational)]
    #[case("missing my ex after the breakup", MoodCategory::Melancholic)]
    #[case("lofi beats to sleep to", MoodCategory::ChillAmbient)]
    #[case("angry metal rage", MoodCategory::IntenseAggressive)]
    #[case("something for tuesday", MoodCategory::CalmPeaceful)]
    fn detects_category(#[case] text: &str, #[case] expected: MoodCategory) {
        assert_eq!(detect_category(text), expected);
    }

    #[test]
    fn ties_keep_the_earlier_category() {
        // "celebrate" counts for both happy_energetic and party_dance.
        assert_eq!(detect_category("let's celebrate"), MoodCategory::HappyEnergetic);
    }

    #[test]
    fn profile_uses_category_defaults() {
        let profile = KeywordMoodAnalyzer.profile_for("chill ambient background noise");
        assert_eq!(profile.category(), MoodCategory::ChillAmbient);
        assert_eq!(profile.energy_level(), 2);
        assert_eq!(profile.valence_level(), 5);
        assert_eq!(
            profile.similar_categories(),
            &[MoodCategory::CalmPeaceful, MoodCategory::Melancholic]
        );
        let characteristics = profile.characteristics();
        assert_eq!(characteristics.energy_preference.as_deref(), Some("low"));
        assert_eq!(characteristics.acousticness_preference.as_deref(), Some("high"));
        assert_eq!(characteristics.instrumentalness_preference.as_deref(), Some("high"));
        assert_eq!(profile.confidence(), Some(0.5));
        assert_eq!(
            profile.interpretation(),
            Some("Detected chill ambient mood from keywords")
        );
    }

    #[test]
    fn high_energy_profile_prefers_electric_sound() {
        let profile = KeywordMoodAnalyzer.profile_for("party all weekend");
        assert_eq!(profile.category(), MoodCategory::PartyDance);
        let characteristics = profile.characteristics();
        assert_eq!(characteristics.energy_preference.as_deref(), Some("high"));
        assert_eq!(characteristics.acousticness_preference.as_deref(), Some("low"));
        assert_eq!(characteristics.instrumentalness_preference.as_deref(), Some("low"));
    }
}
