//! Per-factor scoring functions for memory retrieval.
//!
//! Score = w₁·Semantic + w₂·Emotional + w₃·Goal + w₄·PeakEnd + w₅·Recency
//!
//! Where:
//!   Semantic(m)  = TF-IDF cosine(query, m.content)
//!   Emotional(m) = ½·valence_term + ½·(1 − ½·|Δarousal|)
//!   Goal(m)      = 1 − |Δgoal_relevance|   (averaged with 1 − |Δagency|)
//!   PeakEnd(m)   = m.importance
//!   Recency(m)   = m.recency_score
//!
//! Every factor is clamped to [0, 1]. A factor whose inputs are not finite
//! scores 0 so a single malformed entry cannot disturb the ranking of the rest.

use serde::{Deserialize, Serialize};

use crate::config::{ResonanceMode, RetrievalWeights};
use crate::memory::MemoryEntry;
use crate::retrieval::ScoreBreakdown;
use crate::types::{AppraisalResult, Vad};

/// Raw per-factor scores for one candidate, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    /// Bag-of-words similarity.
    pub semantic: f64,
    /// Emotional resonance.
    pub emotional: f64,
    /// Goal/agency alignment.
    pub goal: f64,
    /// Peak-end importance.
    pub peak_end: f64,
    /// Recency.
    pub recency: f64,
}

impl FactorScores {
    /// Weighted sum, clamped to `[0, 1]`.
    #[must_use]
    pub fn weighted_sum(&self, w: &RetrievalWeights) -> f64 {
        let total = w.semantic * self.semantic
            + w.emotional * self.emotional
            + w.goal * self.goal
            + w.peak_end * self.peak_end
            + w.recency * self.recency;
        unit(total)
    }

    /// Each factor multiplied by its weight.
    #[must_use]
    pub fn contributions(&self, w: &RetrievalWeights) -> ScoreBreakdown {
        ScoreBreakdown {
            semantic: w.semantic * self.semantic,
            emotional: w.emotional * self.emotional,
            goal: w.goal * self.goal,
            peak_end: w.peak_end * self.peak_end,
            recency: w.recency * self.recency,
        }
    }
}

/// Query-side context shared by every candidate.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    /// Appraisal of the query text.
    pub appraisal: &'a AppraisalResult,
    /// Resonance mode.
    pub mode: ResonanceMode,
    /// Query valence below which complementary mode reframes.
    pub distress_threshold: f32,
    /// Average goal alignment with agency alignment.
    pub agency_alignment: bool,
}

/// Score every factor except semantic, which needs the fitted vectorizer.
#[must_use]
pub fn score_entry(ctx: &QueryContext<'_>, entry: &MemoryEntry, semantic: f64) -> FactorScores {
    FactorScores {
        semantic: unit(semantic),
        emotional: emotional_resonance(
            &ctx.appraisal.vad,
            &entry.appraisal.vad,
            ctx.mode,
            ctx.distress_threshold,
        ),
        goal: goal_alignment(ctx.appraisal, &entry.appraisal, ctx.agency_alignment),
        peak_end: unit(f64::from(entry.importance())),
        recency: unit(f64::from(entry.recency_score())),
    }
}

/// Clamp to `[0, 1]`; non-finite values become 0.
#[must_use]
pub fn unit(x: f64) -> f64 {
    if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 }
}

/// `1 − |a − b|`, clamped.
fn closeness(a: f32, b: f32) -> f64 {
    unit(1.0 - (f64::from(a) - f64::from(b)).abs())
}

/// Valence term of emotional resonance.
///
/// In complementary mode a distressed query (valence below the threshold)
/// rewards memories of the opposite sign: `1 − |q + e|`.
#[must_use]
pub fn valence_term(query: f32, entry: f32, mode: ResonanceMode, distress_threshold: f32) -> f64 {
    match mode {
        ResonanceMode::Complementary if query < distress_threshold => {
            unit(1.0 - (f64::from(query) + f64::from(entry)).abs())
        }
        _ => closeness(query, entry),
    }
}

/// Arousal term: always similarity, at half sensitivity.
#[must_use]
pub fn arousal_term(query: f32, entry: f32) -> f64 {
    unit(1.0 - 0.5 * (f64::from(query) - f64::from(entry)).abs())
}

/// Emotional resonance between query and memory.
#[must_use]
pub fn emotional_resonance(query: &Vad, entry: &Vad, mode: ResonanceMode, distress_threshold: f32) -> f64 {
    if !query.is_finite() || !entry.is_finite() {
        return 0.0;
    }
    let valence = valence_term(query.valence(), entry.valence(), mode, distress_threshold);
    let arousal = arousal_term(query.arousal(), entry.arousal());
    unit(0.5 * valence + 0.5 * arousal)
}

/// Goal alignment, optionally averaged with agency alignment.
#[must_use]
pub fn goal_alignment(query: &AppraisalResult, entry: &AppraisalResult, with_agency: bool) -> f64 {
    let goal_ok = query.goal_relevance.is_finite() && entry.goal_relevance.is_finite();
    if !goal_ok {
        return 0.0;
    }
    let goal = closeness(query.goal_relevance, entry.goal_relevance);
    if !with_agency {
        return goal;
    }
    if !(query.agency.is_finite() && entry.agency.is_finite()) {
        return 0.0;
    }
    let agency = closeness(query.agency, entry.agency);
    unit((goal + agency) / 2.0)
}
