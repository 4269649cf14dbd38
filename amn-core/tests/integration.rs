//! Integration Tests: End-to-End Conversation Flows
//!
//! These tests drive the public API the way an embedding application would:
//! TOML config → lexicon CSV on disk → session turns → memory tiers → retrieval.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use amn_core::appraisal::{CognitiveFallback, FallbackError};
use amn_core::config::{AmnConfig, ResonanceMode};
use amn_core::memory::LegacyRecord;
use amn_core::{
    AmnError, AppraisalEngine, CognitiveAppraisal, EpisodicMemory, Lexicon, RetrievalEngine,
    RetrievalResult, Session, SharedSession, Vad, WorkingMemory, format_context,
};

const LEXICON_CSV: &str = "\
Word,Valence,Arousal,Dominance
happy,0.8,0.6,0.6
sad,-0.7,0.4,0.2
furious,-0.8,0.95,0.6
promotion,0.7,0.6,0.8
fired,-0.9,0.8,0.1
calm,0.4,0.1,0.6
";

fn write_lexicon(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("lexicon.csv");
    let mut file = std::fs::File::create(&path).expect("create lexicon");
    file.write_all(LEXICON_CSV.as_bytes()).expect("write lexicon");
    path
}

fn config_toml(lexicon: &Path, extra: &str) -> String {
    format!(
        "[appraisal]\nlexicon_path = {:?}\n\n[memory]\nworking_capacity = 3\n\n{extra}",
        lexicon.display().to_string()
    )
}

fn echo(_: &str, memories: &[RetrievalResult]) -> String {
    format!("I remember {} things", memories.len())
}

// ---------------------------------------------------------------------------
// Appraisal from a CSV lexicon
// ---------------------------------------------------------------------------

#[test]
fn csv_lexicon_reference_scenario() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lexicon = Lexicon::from_csv_path(&write_lexicon(dir.path())).expect("valid lexicon");
    let engine = AppraisalEngine::new(lexicon);

    let vad = engine.analyze("I feel happy and sad");
    assert!((vad.valence() - 0.05).abs() < 1e-6);
    assert!((vad.arousal() - 0.5).abs() < 1e-6);
    assert!((vad.dominance() - 0.4).abs() < 1e-6);

    assert_eq!(engine.analyze("nothing matches here"), Vad::NEUTRAL);
    assert_eq!(engine.full_appraisal("I was fired"), engine.full_appraisal("I was fired"));
}

#[test]
fn missing_lexicon_fails_at_startup() {
    let err = AmnConfig::from_toml("[appraisal]\nlexicon_path = \"/no/such/lexicon.csv\"\n")
        .expect_err("missing file");
    assert!(matches!(err, AmnError::LexiconNotFound(_)));
}

#[test]
fn out_of_range_lexicon_row_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "Word,Valence,Arousal,Dominance\nok,0.1,0.2,0.3\nbad,2.0,0.5,0.5\n")
        .expect("write");
    assert!(matches!(
        Lexicon::from_csv_path(&path),
        Err(AmnError::LexiconRow { .. })
    ));
}

// ---------------------------------------------------------------------------
// Session lifecycle: config → turns → eviction → retrieval across tiers
// ---------------------------------------------------------------------------

#[test]
fn session_from_toml_moves_turns_between_tiers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml = config_toml(&write_lexicon(dir.path()), "[retrieval]\ntop_k = 4\n");
    let config = AmnConfig::from_toml(&toml).expect("valid config");
    let mut session = Session::from_config(&config, "integration", echo).expect("session");

    let turns = [
        "I got a promotion today",
        "I am so happy",
        "my friend was fired",
        "I feel furious about it",
        "trying to stay calm",
    ];
    let mut outcomes = Vec::new();
    for turn in turns {
        outcomes.push(session.step(turn).expect("echo never fails"));
    }

    assert_eq!(session.working().len(), 3);
    assert_eq!(session.episodic().len(), 2);
    assert_eq!(outcomes[3].evicted, Some(outcomes[0].inserted));
    assert_eq!(outcomes[4].evicted, Some(outcomes[1].inserted));

    // Fifth turn sees all four earlier turns (three in WM, one in EM).
    assert_eq!(outcomes[4].retrieved.len(), 4);
    assert_eq!(outcomes[4].reply, "I remember 4 things");
    assert!(outcomes[4].retrieved.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn promotion_query_recalls_promotion_turn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = AmnConfig::from_toml(&config_toml(&write_lexicon(dir.path()), "")).expect("valid");
    let mut session = Session::from_config(&config, "recall", echo).expect("session");

    session.step("I got a promotion at work").expect("step");
    session.step("the weather is grey").expect("step");
    session.step("lunch was fine").expect("step");
    session.step("watched a film").expect("step");

    // The promotion turn is now in episodic memory and still ranks first.
    let outcome = session.step("thinking about my promotion again").expect("step");
    assert!(outcome.retrieved[0].memory.content.contains("promotion"));
}

#[test]
fn complementary_session_prefers_uplifting_memories_when_distressed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml = config_toml(
        &write_lexicon(dir.path()),
        "[retrieval]\nresonance_mode = \"complementary\"\nweights = { semantic = 0.0, emotional = 0.6, goal = 0.2, peak_end = 0.1, recency = 0.1 }\n",
    );
    let config = AmnConfig::from_toml(&toml).expect("valid config");
    assert_eq!(config.retrieval.resonance_mode, ResonanceMode::Complementary);

    let mut session = Session::from_config(&config, "reframe", |_: &str, _: &[RetrievalResult]| {
        String::new()
    })
    .expect("session");
    session.step("happy happy").expect("step");
    session.step("sad sad").expect("step");

    let outcome = session.step("I was fired").expect("step");
    assert!(outcome.retrieved[0].memory.content.contains("happy"));
}

#[test]
fn invalid_weights_fail_at_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml = config_toml(
        &write_lexicon(dir.path()),
        "[retrieval]\nweights = { semantic = 0.5, emotional = 0.5, goal = 0.5, peak_end = 0.0, recency = 0.0 }\n",
    );
    assert!(matches!(
        AmnConfig::from_toml(&toml),
        Err(AmnError::InvalidWeights { .. })
    ));
}

// ---------------------------------------------------------------------------
// Fallback appraisal
// ---------------------------------------------------------------------------

struct FixedFallback(CognitiveAppraisal);

impl CognitiveFallback for FixedFallback {
    fn appraise(&self, _: &str, _: &Vad) -> Result<CognitiveAppraisal, FallbackError> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

fn session_logs(toml: &str) -> String {
    let config = AmnConfig::from_toml(toml).expect("valid config");
    let logs = CapturedLogs::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        Session::from_config(&config, "logs", echo).expect("session");
    });
    logs.contents()
}

#[test]
fn enabled_fallback_without_attachment_is_logged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lexicon = write_lexicon(dir.path());

    let enabled = session_logs(&format!(
        "[appraisal]\nlexicon_path = {:?}\n\n[appraisal.fallback]\nenabled = true\n",
        lexicon.display().to_string()
    ));
    assert!(enabled.contains("WARN"), "{enabled}");
    assert!(enabled.contains("with_fallback"), "{enabled}");

    let disabled = session_logs(&config_toml(&lexicon, ""));
    assert!(!disabled.contains("with_fallback"), "{disabled}");
}

struct TimingOut;

impl CognitiveFallback for TimingOut {
    fn appraise(&self, _: &str, _: &Vad) -> Result<CognitiveAppraisal, FallbackError> {
        Err(FallbackError::Timeout(5000))
    }

    fn name(&self) -> &str {
        "timing-out"
    }
}

#[test]
fn fallback_scalars_flow_into_stored_turns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = AmnConfig::from_toml(&config_toml(&write_lexicon(dir.path()), "")).expect("valid");
    let scalars = CognitiveAppraisal {
        goal_relevance: -0.4,
        agency: 0.9,
        certainty: 0.2,
        novelty: 0.8,
        pleasantness: 0.1,
        control: 0.3,
    };
    let mut session = Session::from_config(&config, "fallback", echo)
        .expect("session")
        .with_fallback(Box::new(FixedFallback(scalars)));
    session.step("I was fired").expect("step");

    let stored = session.working().iter().next().expect("stored turn");
    assert_eq!(stored.appraisal.cognitive(), scalars);
}

#[test]
fn failing_fallback_reverts_to_derivation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lexicon = Lexicon::from_csv_path(&write_lexicon(dir.path())).expect("valid lexicon");
    let plain = AppraisalEngine::new(lexicon.clone());
    let with_fallback = AppraisalEngine::new(lexicon).with_fallback(Box::new(TimingOut));
    assert_eq!(
        plain.full_appraisal("furious and sad"),
        with_fallback.full_appraisal("furious and sad")
    );
}

// ---------------------------------------------------------------------------
// Loose components, shared sessions, legacy records
// ---------------------------------------------------------------------------

#[test]
fn components_compose_without_a_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = AppraisalEngine::new(
        Lexicon::from_csv_path(&write_lexicon(dir.path())).expect("valid lexicon"),
    );
    let mut wm = WorkingMemory::with_capacity(5).expect("valid capacity");
    let mut em = EpisodicMemory::new();
    let retrieval = RetrievalEngine::new(Default::default()).expect("valid config");

    for (i, text) in ["happy news", "sad news", "furious rant", "calm walk", "promotion", "fired"]
        .iter()
        .enumerate()
    {
        let outcome = wm.insert(*text, engine.full_appraisal(text));
        match outcome.evicted {
            Some(evicted) => {
                assert_eq!(i, 5);
                assert_eq!(evicted.content, "happy news");
                em.add(evicted);
            }
            None => assert!(i < 5),
        }
    }

    let query = engine.full_appraisal("more news");
    let results = retrieval.retrieve(&mut wm, &em, "more news", &query);
    assert_eq!(results.len(), 3);
    let context = format_context(&results);
    assert_eq!(context.lines().count(), 3);
    assert!(context.lines().all(|l| l.starts_with("PAST: ")));
}

#[test]
fn shared_session_handles_concurrent_callers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = AmnConfig::from_toml(&config_toml(&write_lexicon(dir.path()), "")).expect("valid");
    let shared = SharedSession::new(Session::from_config(&config, "shared", echo).expect("session"));

    std::thread::scope(|scope| {
        for i in 0..6 {
            let s = shared.clone();
            scope.spawn(move || s.step(&format!("message {i}")).expect("step"));
        }
    });

    let session = shared.lock();
    assert_eq!(session.working().len(), 3);
    assert_eq!(session.episodic().len(), 3);
}

#[test]
fn legacy_flat_records_join_episodic_memory() {
    let json = r#"{"content": "User: old chat", "vad": [0.3, 0.9, 0.5], "timestamp": "2023-01-01T00:00:00Z"}"#;
    let entry = LegacyRecord::from_json(json)
        .expect("legacy record")
        .into_entry(&Default::default())
        .expect("default config is valid");
    assert!((entry.importance() - 1.0).abs() < f32::EPSILON);

    let mut em = EpisodicMemory::new();
    em.add(entry);
    assert!(em.consolidate(em.get_recent(1).next().expect("present")));
}
