//! Memory Retrieval: five-factor weighted ranking over both memory tiers.
//!
//! Candidates are every working-memory entry (after decay) followed by the
//! most recent window of episodic entries. Each candidate is scored as
//!
//!   Score = 0.25·Semantic + 0.30·Emotional + 0.20·Goal + 0.15·PeakEnd + 0.10·Recency
//!
//! (weights configurable, validated to sum to 1.0) and the top-K are
//! returned in descending order. Equal scores keep their scan order.
//!
//! The emotional factor can run in complementary mode, where a distressed
//! query deliberately surfaces memories of the opposite valence to support
//! reframing.

pub mod scoring;
pub mod vectorizer;

pub use scoring::FactorScores;
pub use vectorizer::TfIdfVectorizer;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Span, debug, info};

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::memory::{EpisodicMemory, MemoryEntry, WorkingMemory};
use crate::types::{AppraisalResult, RetrievalScore};

/// Default number of episodic entries scanned per query.
pub const DEFAULT_EPISODIC_WINDOW: usize = 50;

/// A scored retrieval result.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    /// Snapshot of the retrieved memory.
    pub memory: MemoryEntry,
    /// Combined retrieval score in `[0, 1]`.
    pub score: RetrievalScore,
    /// Raw per-factor scores.
    pub factors: FactorScores,
    /// Weighted contribution of each factor to `score`.
    pub breakdown: ScoreBreakdown,
}

/// Per-factor weighted contributions (useful for ablation studies).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Semantic factor contribution.
    pub semantic: f64,
    /// Emotional resonance contribution.
    pub emotional: f64,
    /// Goal alignment contribution.
    pub goal: f64,
    /// Peak-end importance contribution.
    pub peak_end: f64,
    /// Recency contribution.
    pub recency: f64,
}

impl ScoreBreakdown {
    /// Unclamped sum of all contributions.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.semantic + self.emotional + self.goal + self.peak_end + self.recency
    }
}

/// The retrieval engine that finds relevant memories for a query.
#[derive(Debug)]
pub struct RetrievalEngine {
    config: RetrievalConfig,
    episodic_window: usize,
    span: Span,
}

impl RetrievalEngine {
    /// Create a new retrieval engine.
    ///
    /// # Errors
    /// Returns a configuration error if `top_k` is zero or the weights do
    /// not sum to 1.0.
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            episodic_window: DEFAULT_EPISODIC_WINDOW,
            span: Span::none(),
        })
    }

    /// Scan `window` episodic entries instead of the default 50.
    #[must_use]
    pub fn with_episodic_window(mut self, window: usize) -> Self {
        self.episodic_window = window;
        self
    }

    /// Parent span for this engine's log records.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve the top-K memories for a query at the current time.
    pub fn retrieve(
        &self,
        working: &mut WorkingMemory,
        episodic: &EpisodicMemory,
        query_text: &str,
        query: &AppraisalResult,
    ) -> Vec<RetrievalResult> {
        self.retrieve_at(working, episodic, query_text, query, Utc::now())
    }

    /// Retrieve the top-K memories, decaying working memory as of `now`.
    pub fn retrieve_at(
        &self,
        working: &mut WorkingMemory,
        episodic: &EpisodicMemory,
        query_text: &str,
        query: &AppraisalResult,
        now: DateTime<Utc>,
    ) -> Vec<RetrievalResult> {
        let candidates: Vec<&MemoryEntry> = working
            .get_all_at(now)
            .iter()
            .chain(episodic.get_recent(self.episodic_window))
            .collect();
        self.rank(&candidates, query_text, query)
    }

    /// Score and rank an explicit candidate list.
    #[must_use]
    pub fn rank(
        &self,
        candidates: &[&MemoryEntry],
        query_text: &str,
        query: &AppraisalResult,
    ) -> Vec<RetrievalResult> {
        if candidates.is_empty() {
            debug!(parent: &self.span, "no candidates to rank");
            return Vec::new();
        }

        let semantic = self.semantic_scores(candidates, query_text);
        let ctx = scoring::QueryContext {
            appraisal: query,
            mode: self.config.resonance_mode,
            distress_threshold: self.config.distress_threshold,
            agency_alignment: self.config.agency_alignment,
        };

        let mut results: Vec<RetrievalResult> = candidates
            .iter()
            .zip(semantic)
            .map(|(memory, sem)| {
                let factors = scoring::score_entry(&ctx, memory, sem);
                let weights = &self.config.weights;
                RetrievalResult {
                    memory: (*memory).clone(),
                    score: RetrievalScore::new(factors.weighted_sum(weights)),
                    factors,
                    breakdown: factors.contributions(weights),
                }
            })
            .collect();

        // Stable: equal scores keep scan order.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(self.config.top_k);

        if let Some(top) = results.first() {
            info!(
                parent: &self.span,
                candidates = candidates.len(),
                top_id = %top.memory.id,
                top_score = top.score.value(),
                "retrieved memories"
            );
        }
        results
    }

    /// TF-IDF cosine for every candidate; all zeros if no vocabulary can be fit.
    fn semantic_scores(&self, candidates: &[&MemoryEntry], query_text: &str) -> Vec<f64> {
        let corpus = std::iter::once(query_text).chain(candidates.iter().map(|m| m.content.as_str()));
        let Some(vectorizer) = TfIdfVectorizer::fit(corpus, self.config.max_features) else {
            debug!(parent: &self.span, "empty vocabulary; semantic factor disabled");
            return vec![0.0; candidates.len()];
        };
        let query_vec = vectorizer.transform(query_text);
        candidates
            .iter()
            .map(|m| query_vec.cosine(&vectorizer.transform(&m.content)))
            .collect()
    }
}
