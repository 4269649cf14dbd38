//! AMN Benchmark Suite
//!
//! Per-turn latency targets (single conversation, default config):
//!   appraisal_sentence ................ < 20μs
//!   working_memory_insert ............. < 5μs
//!   retrieval_top3_wm5_em50 ........... < 2ms
//!   session_turn_stub_generator ....... < 3ms

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use amn_core::config::{Factor, ResonanceMode, RetrievalConfig, RetrievalWeights};
use amn_core::{
    AppraisalEngine, AppraisalResult, EpisodicMemory, Lexicon, RetrievalEngine, RetrievalResult,
    Session, Vad, WorkingMemory,
};

const TOPICS: &[&str] = &[
    "my project deadline at work keeps moving",
    "we had a lovely family dinner on sunday",
    "I am worried about my exams next week",
    "the holiday trip was relaxing and happy",
    "my friend was angry about the broken promise",
];

fn lexicon() -> Lexicon {
    Lexicon::from_entries([
        ("happy", 0.8, 0.6, 0.6),
        ("lovely", 0.85, 0.5, 0.6),
        ("relaxing", 0.6, 0.1, 0.6),
        ("worried", -0.6, 0.7, 0.3),
        ("angry", -0.7, 0.9, 0.6),
        ("broken", -0.5, 0.5, 0.3),
        ("deadline", -0.3, 0.7, 0.4),
    ])
    .expect("valid lexicon")
}

fn turn_text(i: usize) -> String {
    format!("User: {} (turn {i})\nAgent: that sounds important", TOPICS[i % TOPICS.len()])
}

fn turn_appraisal(i: usize) -> AppraisalResult {
    let v = (i as f32 * 0.37).sin();
    let a = (i as f32 * 0.21).cos().abs();
    AppraisalResult::from_vad(Vad::new(v, a, 0.5))
}

/// Working memory of 5 plus an archive of `archived` evicted turns.
fn populated(archived: usize) -> (WorkingMemory, EpisodicMemory) {
    let mut wm = WorkingMemory::with_capacity(5).expect("valid capacity");
    let mut em = EpisodicMemory::new();
    for i in 0..archived + 5 {
        if let Some(evicted) = wm.insert(turn_text(i), turn_appraisal(i)).evicted {
            em.add(evicted);
        }
    }
    (wm, em)
}

/// Benchmark: lexicon appraisal of one sentence (target: < 20μs).
fn bench_appraisal(c: &mut Criterion) {
    let engine = AppraisalEngine::new(lexicon());
    c.bench_function("appraisal_sentence", |b| {
        b.iter(|| black_box(engine.full_appraisal(black_box("I am so worried and angry about the deadline"))));
    });
}

/// Benchmark: insert into a full working memory (target: < 5μs).
fn bench_insert(c: &mut Criterion) {
    let (mut wm, _) = populated(0);
    let appraisal = turn_appraisal(3);
    c.bench_function("working_memory_insert", |b| {
        b.iter(|| {
            let outcome = wm.insert(black_box("User: hello\nAgent: hi"), appraisal);
            black_box(outcome.evicted);
        });
    });
}

/// Benchmark: top-3 retrieval over growing archives (target: < 2ms at 50).
fn bench_retrieval(c: &mut Criterion) {
    let query = turn_appraisal(7);
    let mut group = c.benchmark_group("retrieval_top3");
    for archived in [10usize, 50, 200] {
        let (mut wm, em) = populated(archived);
        let engine = RetrievalEngine::new(RetrievalConfig::default()).expect("valid config");
        group.bench_with_input(BenchmarkId::from_parameter(archived), &archived, |b, _| {
            b.iter(|| black_box(engine.retrieve(&mut wm, &em, black_box("deadline at work"), &query)));
        });
    }
    group.finish();
}

/// Benchmark: ablation presets cost the same as the full model.
fn bench_ablation(c: &mut Criterion) {
    let query = turn_appraisal(11);
    let (mut wm, em) = populated(50);
    let presets = [
        ("full", RetrievalWeights::default(), ResonanceMode::Similarity),
        ("complementary", RetrievalWeights::default(), ResonanceMode::Complementary),
        ("no_emotion", RetrievalWeights::default().without(Factor::Emotional), ResonanceMode::Similarity),
        ("semantic_only", RetrievalWeights::semantic_only(), ResonanceMode::Similarity),
    ];
    let mut group = c.benchmark_group("retrieval_ablation");
    for (name, weights, mode) in presets {
        let engine = RetrievalEngine::new(RetrievalConfig {
            weights,
            resonance_mode: mode,
            ..RetrievalConfig::default()
        })
        .expect("valid config");
        group.bench_function(name, |b| {
            b.iter(|| black_box(engine.retrieve(&mut wm, &em, black_box("family dinner"), &query)));
        });
    }
    group.finish();
}

/// Benchmark: one full session turn with a stub generator (target: < 3ms).
fn bench_session_turn(c: &mut Criterion) {
    let (wm, em) = populated(50);
    let mut session = Session::new(
        AppraisalEngine::new(lexicon()),
        wm,
        em,
        RetrievalEngine::new(RetrievalConfig::default()).expect("valid config"),
        |_: &str, memories: &[RetrievalResult]| format!("recalled {}", memories.len()),
    );
    c.bench_function("session_turn_stub_generator", |b| {
        b.iter(|| black_box(session.step(black_box("I am worried about work")).expect("infallible")));
    });
}

criterion_group!(
    benches,
    bench_appraisal,
    bench_insert,
    bench_retrieval,
    bench_ablation,
    bench_session_turn,
);
criterion_main!(benches);
