//! Core type definitions for the affective memory system.
//!
//! All types are serializable so retrieval results can be handed to
//! external collaborators (response generators, inspectors) as-is.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a memory entry.
///
/// Backed by a random v4 UUID, so identifiers are unique for the lifetime
/// of the process (and in practice across processes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Emotional Model: VAD (Valence-Arousal-Dominance)
// ---------------------------------------------------------------------------

/// VAD emotional state.
///
/// - **Valence**: unpleasant (-1) → pleasant (+1)
/// - **Arousal**: calm (0) → excited (1)
/// - **Dominance**: submissive (0) → dominant (1)
///
/// Values are immutable once produced by the appraisal engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vad {
    valence: f32,
    arousal: f32,
    dominance: f32,
}

impl Vad {
    /// Neutral (all-zero) emotional state, produced when no lexicon word matches.
    pub const NEUTRAL: Self = Self {
        valence: 0.0,
        arousal: 0.0,
        dominance: 0.0,
    };

    /// Create a new VAD triple, clamping each component to its documented range.
    ///
    /// Non-finite components are kept as-is so that downstream scoring can
    /// detect and neutralise them instead of silently hiding bad data.
    #[must_use]
    pub fn new(valence: f32, arousal: f32, dominance: f32) -> Self {
        Self {
            valence: clamp_finite(valence, -1.0, 1.0),
            arousal: clamp_finite(arousal, 0.0, 1.0),
            dominance: clamp_finite(dominance, 0.0, 1.0),
        }
    }

    /// Unpleasant (-1.0) to pleasant (+1.0).
    #[must_use]
    pub fn valence(&self) -> f32 {
        self.valence
    }

    /// Calm (0.0) to excited (1.0).
    #[must_use]
    pub fn arousal(&self) -> f32 {
        self.arousal
    }

    /// Submissive (0.0) to dominant (1.0).
    #[must_use]
    pub fn dominance(&self) -> f32 {
        self.dominance
    }

    /// Whether every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.valence.is_finite() && self.arousal.is_finite() && self.dominance.is_finite()
    }
}

impl Default for Vad {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for Vad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.2})",
            self.valence, self.arousal, self.dominance
        )
    }
}

fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Cognitive appraisal
// ---------------------------------------------------------------------------

/// The six cognitive-appraisal scalars that accompany a VAD triple.
///
/// Conventionally in `[0, 1]`; values produced by an external fallback
/// are not clamped (goal relevance in particular may be negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CognitiveAppraisal {
    /// How much the event matters to the speaker's goals.
    pub goal_relevance: f32,
    /// Degree to which the speaker caused the event.
    pub agency: f32,
    /// How certain the outcome is.
    pub certainty: f32,
    /// How unexpected the event is.
    pub novelty: f32,
    /// Intrinsic pleasantness.
    pub pleasantness: f32,
    /// Perceived ability to influence the outcome.
    pub control: f32,
}

impl CognitiveAppraisal {
    /// Deterministic derivation from a VAD triple.
    #[must_use]
    pub fn derive(vad: &Vad) -> Self {
        Self {
            goal_relevance: vad.valence().max(0.0),
            agency: vad.dominance(),
            certainty: 1.0 - vad.arousal(),
            novelty: vad.arousal(),
            pleasantness: (vad.valence() + 1.0) / 2.0,
            control: vad.dominance(),
        }
    }

    /// Whether every scalar is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.goal_relevance,
            self.agency,
            self.certainty,
            self.novelty,
            self.pleasantness,
            self.control,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Full appraisal of a piece of text: VAD plus cognitive appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppraisalResult {
    /// Core emotional triple.
    pub vad: Vad,
    /// How much the event matters to the speaker's goals.
    pub goal_relevance: f32,
    /// Degree to which the speaker caused the event.
    pub agency: f32,
    /// How certain the outcome is.
    pub certainty: f32,
    /// How unexpected the event is.
    pub novelty: f32,
    /// Intrinsic pleasantness.
    pub pleasantness: f32,
    /// Perceived ability to influence the outcome.
    pub control: f32,
}

impl AppraisalResult {
    /// Build an appraisal purely from VAD using the deterministic rules.
    #[must_use]
    pub fn from_vad(vad: Vad) -> Self {
        Self::with_cognitive(vad, CognitiveAppraisal::derive(&vad))
    }

    /// Combine a VAD triple with externally produced cognitive scalars.
    #[must_use]
    pub fn with_cognitive(vad: Vad, c: CognitiveAppraisal) -> Self {
        Self {
            vad,
            goal_relevance: c.goal_relevance,
            agency: c.agency,
            certainty: c.certainty,
            novelty: c.novelty,
            pleasantness: c.pleasantness,
            control: c.control,
        }
    }

    /// The cognitive half of this appraisal.
    #[must_use]
    pub fn cognitive(&self) -> CognitiveAppraisal {
        CognitiveAppraisal {
            goal_relevance: self.goal_relevance,
            agency: self.agency,
            certainty: self.certainty,
            novelty: self.novelty,
            pleasantness: self.pleasantness,
            control: self.control,
        }
    }

    /// High-arousal or strongly goal-relevant moments are worth consolidating.
    ///
    /// This is an appraisal-side hint, independent of the episodic
    /// consolidation gate (which only looks at importance).
    #[must_use]
    pub fn suggests_consolidation(&self) -> bool {
        self.vad.arousal() > 0.7 || self.goal_relevance > 0.8
    }
}

impl Default for AppraisalResult {
    fn default() -> Self {
        Self::from_vad(Vad::NEUTRAL)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Wall-clock hours elapsed from `since` to `now`.
///
/// A clock that runs backwards yields zero rather than a negative age.
#[must_use]
pub fn hours_between(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - since).num_milliseconds().max(0);
    millis as f64 / 3_600_000.0
}

// ---------------------------------------------------------------------------
// Retrieval Score
// ---------------------------------------------------------------------------

/// Composite score used to rank memories during retrieval.
///
/// Wraps an [`OrderedFloat`] so scores have a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RetrievalScore(pub OrderedFloat<f64>);

impl RetrievalScore {
    /// Create a retrieval score from a raw f64.
    #[must_use]
    pub fn new(score: f64) -> Self {
        Self(OrderedFloat(score))
    }

    /// Get the raw score value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0.into_inner()
    }
}

impl fmt::Display for RetrievalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vad_is_clamped_to_documented_ranges() {
        let vad = Vad::new(-3.0, 1.5, -0.2);
        assert_eq!(vad.valence(), -1.0);
        assert_eq!(vad.arousal(), 1.0);
        assert_eq!(vad.dominance(), 0.0);
    }

    #[test]
    fn vad_keeps_non_finite_for_detection() {
        let vad = Vad::new(f32::NAN, 0.5, 0.5);
        assert!(!vad.is_finite());
    }

    #[test]
    fn derivation_follows_locked_rules() {
        let appraisal = AppraisalResult::from_vad(Vad::new(-0.4, 0.8, 0.3));
        assert_eq!(appraisal.goal_relevance, 0.0);
        assert!((appraisal.agency - 0.3).abs() < 1e-6);
        assert!((appraisal.certainty - 0.2).abs() < 1e-6);
        assert!((appraisal.novelty - 0.8).abs() < 1e-6);
        assert!((appraisal.pleasantness - 0.3).abs() < 1e-6);
        assert!((appraisal.control - 0.3).abs() < 1e-6);
    }

    #[test]
    fn consolidation_hint_on_arousal_or_goal() {
        assert!(AppraisalResult::from_vad(Vad::new(0.0, 0.9, 0.5)).suggests_consolidation());
        assert!(AppraisalResult::from_vad(Vad::new(0.9, 0.2, 0.5)).suggests_consolidation());
        assert!(!AppraisalResult::from_vad(Vad::new(0.5, 0.5, 0.5)).suggests_consolidation());
    }

    #[test]
    fn backwards_clock_has_zero_age() {
        let now = Utc::now();
        let later = now + chrono::Duration::hours(2);
        assert_eq!(hours_between(later, now), 0.0);
        assert!((hours_between(now, later) - 2.0).abs() < 1e-9);
    }
}
