/// Classification, scoring and selection over synthetic playlists.
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mood_curator::analysis::synthetic_tracks;
use mood_curator::collaborators::KeywordMoodAnalyzer;
use mood_curator::pipeline::classify::classify_tracks;
use mood_curator::pipeline::config::EngineConfig;
use mood_curator::pipeline::score::score_tracks;
use mood_curator::pipeline::select::{DurationSelector, KeepOrder};

fn bench_classification(c: &mut Criterion) {
    let tracks = synthetic_tracks(2_000, 6);
    let thresholds = EngineConfig::default().classifier;

    c.bench_function("classify_tracks_2k", |b| {
        b.iter(|| {
            let classified = classify_tracks(tracks.clone(), &thresholds);
            black_box(classified.len());
        });
    });
}

fn bench_score_and_select(c: &mut Criterion) {
    let config = EngineConfig::default();
    let classified = classify_tracks(synthetic_tracks(2_000, 5), &config.classifier);
    let profile = KeywordMoodAnalyzer.profile_for("slow sunday morning coffee");
    let selector = DurationSelector::new(config);

    c.bench_function("score_and_select_2k_tracks_4h", |b| {
        b.iter(|| {
            let scored = score_tracks(classified.clone(), &profile, None);
            let result = selector.select(scored, 14_400_000, &mut KeepOrder);
            black_box(result.track_count);
        });
    });
}

criterion_group!(benches, bench_classification, bench_score_and_select);
criterion_main!(benches);
