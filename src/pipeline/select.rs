//! Duration-constrained selection of scored tracks.
//!
//! Selection runs in up to three steps:
//!
//! 1. **Primary pass**: best-first over tracks at or above the score floor,
//!    capping each artist and refusing tracks that overshoot the target by
//!    more than the tolerance (the first few picks are always accepted).
//! 2. **Fill pass**: when the primary pass reached less than the trigger
//!    share of the target, tracks the primary pass skipped for artist cap or
//!    budget are added in rank order with a looser artist cap and no budget.
//!    The score floor still applies, so a playlist where nothing reaches it
//!    selects nothing.
//! 3. **Reshuffle**: long selections keep their head and tail pinned and
//!    permute the middle for variety.

mod reshuffle;

use std::collections::HashMap;

use tracing::{debug, info};

pub use reshuffle::{KeepOrder, RandomReshuffle, Reshuffle};

use super::config::EngineConfig;
use crate::model::{ScoredTrack, SelectionResult};

/// Reason attached to fill-pass tracks the primary pass left out as over budget.
pub const FILL_DURATION_REASON: &str = "Added to fill duration";
/// Reason attached to fill-pass tracks the primary pass left out on artist cap.
pub const FILL_VARIETY_REASON: &str = "Added for variety";

/// Counters describing how a selection was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTrace {
    pub candidates: usize,
    pub below_floor: usize,
    pub artist_capped: usize,
    pub over_budget: usize,
    pub primary_picks: usize,
    pub fill_picks: usize,
    pub fill_pass_used: bool,
    pub reshuffled: bool,
}

/// Greedy duration-bounded selector.
#[derive(Debug, Clone, Default)]
pub struct DurationSelector {
    config: EngineConfig,
}

struct Pick {
    index: usize,
    reason: Option<&'static str>,
}

/// Why the primary pass left a track out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    BelowFloor,
    ArtistCapped,
    OverBudget,
}

impl DurationSelector {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Select tracks approximating `target_ms`. Never fails; an empty result
    /// is a valid outcome.
    pub fn select(
        &self,
        tracks: Vec<ScoredTrack>,
        target_ms: u64,
        reshuffle: &mut dyn Reshuffle,
    ) -> SelectionResult {
        self.select_with_trace(tracks, target_ms, reshuffle).0
    }

    pub fn select_with_trace(
        &self,
        mut tracks: Vec<ScoredTrack>,
        target_ms: u64,
        reshuffle: &mut dyn Reshuffle,
    ) -> (SelectionResult, SelectionTrace) {
        let config = &self.config;
        let mut trace = SelectionTrace {
            candidates: tracks.len(),
            ..SelectionTrace::default()
        };

        // Stable sort keeps the playlist order among equal scores.
        tracks.sort_by(|a, b| b.mood_score.cmp(&a.mood_score));

        let durations: Vec<u64> = tracks
            .iter()
            .map(|scored| scored.track.effective_duration_ms(config.default_duration_ms))
            .collect();
        let artists: Vec<String> = tracks.iter().map(|scored| scored.track.artist_key()).collect();

        let mut picks: Vec<Pick> = Vec::new();
        let mut taken = vec![false; tracks.len()];
        let mut skipped: Vec<Option<Skip>> = vec![None; tracks.len()];
        let mut per_artist: HashMap<&str, usize> = HashMap::new();
        let mut total_ms = 0u64;
        let budget_ms = target_ms.saturating_add(config.over_budget_tolerance_ms);

        for (index, scored) in tracks.iter().enumerate() {
            if total_ms >= target_ms {
                break;
            }
            if scored.mood_score < config.score_floor {
                trace.below_floor += 1;
                skipped[index] = Some(Skip::BelowFloor);
                continue;
            }
            let artist = artists[index].as_str();
            if per_artist.get(artist).copied().unwrap_or(0) >= config.artist_cap_primary {
                trace.artist_capped += 1;
                skipped[index] = Some(Skip::ArtistCapped);
                continue;
            }
            let duration = durations[index];
            if picks.len() >= config.min_forced_tracks && total_ms.saturating_add(duration) > budget_ms {
                trace.over_budget += 1;
                skipped[index] = Some(Skip::OverBudget);
                continue;
            }

            *per_artist.entry(artist).or_insert(0) += 1;
            total_ms = total_ms.saturating_add(duration);
            taken[index] = true;
            picks.push(Pick {
                index,
                reason: None,
            });
        }
        trace.primary_picks = picks.len();

        #[allow(clippy::cast_precision_loss)]
        let fill_threshold = target_ms as f64 * config.fill_trigger_ratio;
        #[allow(clippy::cast_precision_loss)]
        let needs_fill = (total_ms as f64) < fill_threshold && picks.len() < tracks.len();

        if needs_fill {
            trace.fill_pass_used = true;
            debug!(
                total_ms,
                target_ms,
                primary_picks = picks.len(),
                "primary pass fell short, running fill pass"
            );

            for (index, scored) in tracks.iter().enumerate() {
                if total_ms >= target_ms {
                    break;
                }
                if taken[index] || scored.mood_score < config.score_floor {
                    continue;
                }
                let artist = artists[index].as_str();
                if per_artist.get(artist).copied().unwrap_or(0) >= config.artist_cap_fill {
                    continue;
                }

                *per_artist.entry(artist).or_insert(0) += 1;
                total_ms = total_ms.saturating_add(durations[index]);
                taken[index] = true;
                let reason = match skipped[index] {
                    Some(Skip::OverBudget) => FILL_DURATION_REASON,
                    _ => FILL_VARIETY_REASON,
                };
                picks.push(Pick {
                    index,
                    reason: Some(reason),
                });
                trace.fill_picks += 1;
            }
        }

        let mut slots: Vec<Option<ScoredTrack>> = tracks.into_iter().map(Some).collect();
        let mut selected: Vec<ScoredTrack> = picks
            .into_iter()
            .filter_map(|pick| {
                let mut scored = slots[pick.index].take()?;
                if let Some(reason) = pick.reason {
                    scored.reason = Some(reason.to_string());
                }
                Some(scored)
            })
            .collect();

        trace.reshuffled = self.reshuffle_middle(&mut selected, reshuffle);

        let result = SelectionResult::from_tracks(selected, config.default_duration_ms);
        info!(
            target_ms,
            total_ms = result.total_duration_ms,
            track_count = result.track_count,
            fill_pass = trace.fill_pass_used,
            below_floor = trace.below_floor,
            artist_capped = trace.artist_capped,
            over_budget = trace.over_budget,
            "selection completed"
        );
        (result, trace)
    }

    fn reshuffle_middle(&self, selected: &mut [ScoredTrack], reshuffle: &mut dyn Reshuffle) -> bool {
        let pinned = self.config.reshuffle_pinned;
        let len = selected.len();
        if len <= self.config.reshuffle_threshold || len <= pinned * 2 {
            return false;
        }
        reshuffle.permute(&mut selected[pinned..len - pinned]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Track;

    fn scored(id: &str, artist: &str, duration_ms: Option<u64>, mood_score: u8) -> ScoredTrack {
        ScoredTrack {
            track: Track {
                id: id.to_string(),
                name: id.to_string(),
                artist: Some(artist.to_string()),
                duration_ms,
                ..Track::default()
            },
            mood_score,
            reason: None,
        }
    }

    fn ids(result: &SelectionResult) -> Vec<&str> {
        result.tracks.iter().map(ScoredTrack::id).collect()
    }

    /// Reverses the segment so tests can observe exactly what was permuted.
    struct Reverse;

    impl Reshuffle for Reverse {
        fn permute(&mut self, segment: &mut [ScoredTrack]) {
            segment.reverse();
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let tracks = vec![
            scored("a", "x", Some(60_000), 50),
            scored("b", "y", Some(60_000), 70),
            scored("c", "z", Some(60_000), 50),
        ];
        let result = DurationSelector::default().select(tracks, 180_000, &mut KeepOrder);
        assert_eq!(ids(&result), vec!["b", "a", "c"]);
    }

    #[test]
    fn artist_cap_is_case_insensitive() {
        let tracks = vec![
            scored("a", "Daft Punk", Some(100_000), 90),
            scored("b", "daft punk", Some(100_000), 85),
            scored("c", "DAFT PUNK", Some(100_000), 80),
            scored("d", "Other", Some(100_000), 75),
        ];
        let (result, trace) =
            DurationSelector::default().select_with_trace(tracks, 300_000, &mut KeepOrder);
        assert_eq!(ids(&result), vec!["a", "b", "d"]);
        assert_eq!(trace.artist_capped, 1);
        assert!(!trace.fill_pass_used);
    }

    #[test]
    fn over_budget_tracks_are_skipped_after_forced_picks() {
        let tracks = vec![
            scored("a", "1", Some(100_000), 90),
            scored("b", "2", Some(100_000), 90),
            scored("c", "3", Some(100_000), 90),
            scored("long", "4", Some(900_000), 90),
            scored("d", "5", Some(100_000), 80),
        ];
        let (result, trace) =
            DurationSelector::default().select_with_trace(tracks, 400_000, &mut KeepOrder);
        assert_eq!(ids(&result), vec!["a", "b", "c", "d"]);
        assert_eq!(trace.over_budget, 1);
        assert_eq!(result.total_duration_ms, 400_000);
    }

    #[test]
    fn first_picks_ignore_budget() {
        let tracks = vec![scored("epic", "1", Some(2_000_000), 90)];
        let result = DurationSelector::default().select(tracks, 300_000, &mut KeepOrder);
        assert_eq!(ids(&result), vec!["epic"]);
        assert_eq!(result.total_duration_ms, 2_000_000);
    }

    #[test]
    fn missing_duration_uses_fallback() {
        let tracks = vec![scored("a", "1", None, 90), scored("b", "2", None, 90)];
        let result = DurationSelector::default().select(tracks, 400_000, &mut KeepOrder);
        assert_eq!(result.total_duration_ms, 420_000);
        assert!(result.tracks.iter().all(|t| t.track.duration_ms.is_none()));
    }

    #[test]
    fn fill_pass_keeps_the_floor_and_tags_artist_capped_tracks() {
        let tracks = vec![
            scored("a", "same", Some(100_000), 90),
            scored("b", "same", Some(100_000), 80),
            scored("c", "same", Some(100_000), 70),
            scored("low", "other", Some(100_000), 10),
        ];
        let (result, trace) =
            DurationSelector::default().select_with_trace(tracks, 1_000_000, &mut KeepOrder);
        assert!(trace.fill_pass_used);
        assert_eq!(trace.below_floor, 1);
        assert_eq!(ids(&result), vec!["a", "b", "c"]);
        assert_eq!(result.tracks[0].reason, None);
        assert_eq!(result.tracks[2].reason.as_deref(), Some(FILL_VARIETY_REASON));
    }

    #[test]
    fn fill_pass_tags_over_budget_tracks() {
        let tracks = vec![
            scored("a", "1", Some(100_000), 90),
            scored("b", "2", Some(100_000), 90),
            scored("c", "3", Some(100_000), 90),
            scored("long", "4", Some(1_200_000), 80),
            scored("d", "5", Some(100_000), 70),
        ];
        let (result, trace) =
            DurationSelector::default().select_with_trace(tracks, 1_000_000, &mut KeepOrder);
        assert_eq!(trace.over_budget, 1);
        assert_eq!(trace.fill_picks, 1);
        assert_eq!(ids(&result), vec!["a", "b", "c", "d", "long"]);
        assert_eq!(result.tracks[4].reason.as_deref(), Some(FILL_DURATION_REASON));
        assert_eq!(result.total_duration_ms, 1_600_000);
    }

    #[test]
    fn huge_durations_saturate() {
        let tracks = vec![
            scored("a", "1", Some(u64::MAX - 10), 90),
            scored("b", "2", Some(u64::MAX - 10), 90),
        ];
        let result = DurationSelector::default().select(tracks, u64::MAX, &mut KeepOrder);
        assert_eq!(result.track_count, 2);
        assert_eq!(result.total_duration_ms, u64::MAX);
    }

    #[test]
    fn reshuffle_only_touches_the_middle() {
        let tracks: Vec<ScoredTrack> = (0..10)
            .map(|i| scored(&format!("t{i}"), &format!("artist{i}"), Some(60_000), 90))
            .collect();
        let (result, trace) =
            DurationSelector::default().select_with_trace(tracks, 600_000, &mut Reverse);
        assert!(trace.reshuffled);
        assert_eq!(
            ids(&result),
            vec!["t0", "t1", "t2", "t6", "t5", "t4", "t3", "t7", "t8", "t9"]
        );
    }

    #[test]
    fn eight_tracks_are_not_reshuffled() {
        let tracks: Vec<ScoredTrack> = (0..8)
            .map(|i| scored(&format!("t{i}"), &format!("artist{i}"), Some(60_000), 90))
            .collect();
        let (result, trace) =
            DurationSelector::default().select_with_trace(tracks, 480_000, &mut Reverse);
        assert!(!trace.reshuffled);
        assert_eq!(result.tracks[3].id(), "t3");
    }
}
