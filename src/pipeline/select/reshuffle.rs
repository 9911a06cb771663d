//! Injectable permutation source for the middle of a selection.

use rand::rngs::{StdRng, ThreadRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::ScoredTrack;

/// Reorders the unpinned middle segment of a selection.
pub trait Reshuffle {
    fn permute(&mut self, segment: &mut [ScoredTrack]);
}

/// Leaves the segment untouched. Used for deterministic runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl Reshuffle for KeepOrder {
    fn permute(&mut self, _segment: &mut [ScoredTrack]) {}
}

/// Uniform shuffle driven by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomReshuffle<R> {
    rng: R,
}

impl<R: Rng> RandomReshuffle<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomReshuffle<ThreadRng> {
    #[must_use]
    pub fn from_thread_rng() -> Self {
        Self::new(rand::rng())
    }
}

impl RandomReshuffle<StdRng> {
    /// Reproducible shuffle for replays and tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Reshuffle for RandomReshuffle<R> {
    fn permute(&mut self, segment: &mut [ScoredTrack]) {
        segment.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Track;

    fn segment(n: usize) -> Vec<ScoredTrack> {
        (0..n)
            .map(|i| ScoredTrack {
                track: Track {
                    id: format!("t{i}"),
                    ..Track::default()
                },
                mood_score: 50,
                reason: None,
            })
            .collect()
    }

    fn ids(tracks: &[ScoredTrack]) -> Vec<String> {
        tracks.iter().map(|t| t.track.id.clone()).collect()
    }

    #[test]
    fn keep_order_is_identity() {
        let mut tracks = segment(6);
        let before = ids(&tracks);
        KeepOrder.permute(&mut tracks);
        assert_eq!(ids(&tracks), before);
    }

    #[test]
    fn seeded_shuffle_is_reproducible_and_preserves_members() {
        let mut first = segment(12);
        let mut second = segment(12);
        RandomReshuffle::seeded(99).permute(&mut first);
        RandomReshuffle::seeded(99).permute(&mut second);
        assert_eq!(ids(&first), ids(&second));

        let mut sorted = ids(&first);
        sorted.sort();
        let mut expected = ids(&segment(12));
        expected.sort();
        assert_eq!(sorted, expected);
    }
}
