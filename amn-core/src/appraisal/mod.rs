//! Appraisal Engine: text → VAD → cognitive appraisal.
//!
//! Text is tokenized into lowercase words; every token found in the
//! [`Lexicon`] contributes its VAD triple and the output is the per-component
//! arithmetic mean (neutral when nothing matches). The six cognitive
//! scalars are derived deterministically from VAD unless a
//! [`CognitiveFallback`] is configured, in which case it is consulted first
//! and any failure silently reverts to the derivation.

pub mod lexicon;

pub use lexicon::Lexicon;

use thiserror::Error;
use tracing::{Span, info, warn};

use crate::config::AppraisalConfig;
use crate::error::{AmnError, Result};
use crate::logging::truncate_for_log;
use crate::text::tokenize;
use crate::types::{AppraisalResult, CognitiveAppraisal, Vad};

/// Characters of input text kept in appraisal log records.
const LOG_TEXT_CHARS: usize = 50;

/// Why an external appraisal attempt produced nothing usable.
#[derive(Debug, Error)]
pub enum FallbackError {
    /// The call did not finish within its time budget.
    #[error("fallback timed out after {0}ms")]
    Timeout(u64),
    /// The external service could not be reached or returned an error.
    #[error("fallback unavailable: {0}")]
    Unavailable(String),
    /// The response could not be interpreted as six appraisal scalars.
    #[error("malformed fallback response: {0}")]
    Malformed(String),
}

/// External source of cognitive-appraisal scalars (typically a language model).
///
/// Implementations must bound their own running time; the engine calls
/// them synchronously on the turn's thread.
pub trait CognitiveFallback: Send + Sync {
    /// Produce the six cognitive scalars for `text`, given its lexicon VAD.
    ///
    /// # Errors
    /// Any [`FallbackError`]; the engine absorbs it.
    fn appraise(&self, text: &str, vad: &Vad) -> std::result::Result<CognitiveAppraisal, FallbackError>;

    /// Short name for log records.
    fn name(&self) -> &str;
}

/// Lexicon-based emotional appraisal.
pub struct AppraisalEngine {
    lexicon: Lexicon,
    lexicon_weight: f32,
    fallback: Option<Box<dyn CognitiveFallback>>,
    span: Span,
}

impl std::fmt::Debug for AppraisalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppraisalEngine")
            .field("lexicon_words", &self.lexicon.len())
            .field("lexicon_weight", &self.lexicon_weight)
            .field("fallback", &self.fallback.as_ref().map(|fb| fb.name()))
            .finish_non_exhaustive()
    }
}

impl AppraisalEngine {
    /// Create an engine over an already-loaded lexicon.
    #[must_use]
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon,
            lexicon_weight: 1.0,
            fallback: None,
            span: Span::none(),
        }
    }

    /// Create an engine from configuration, loading the CSV lexicon.
    ///
    /// The external fallback is attached separately with
    /// [`AppraisalEngine::with_fallback`]; this crate has no network client.
    ///
    /// # Errors
    /// `AmnError::Config` if no lexicon path is configured, or any lexicon
    /// loading error.
    pub fn from_config(config: &AppraisalConfig) -> Result<Self> {
        let path = config
            .lexicon_path
            .as_deref()
            .ok_or_else(|| AmnError::Config("appraisal.lexicon_path is not set".into()))?;
        let lexicon = Lexicon::from_csv_path(path)?;
        Ok(Self::new(lexicon).with_lexicon_weight(config.lexicon_weight))
    }

    /// Scale the lexicon valence by `weight`.
    #[must_use]
    pub fn with_lexicon_weight(mut self, weight: f32) -> Self {
        self.lexicon_weight = weight;
        self
    }

    /// Consult an external source for the cognitive scalars.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Box<dyn CognitiveFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Parent span for this engine's log records.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The loaded lexicon.
    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Lexicon-only VAD, before the valence weight is applied.
    #[must_use]
    pub fn lexicon_vad(&self, text: &str) -> Vad {
        let (mut v, mut a, mut d) = (0.0_f64, 0.0_f64, 0.0_f64);
        let mut matched = 0_u32;
        for token in tokenize(text) {
            if let Some(vad) = self.lexicon.get(&token) {
                v += f64::from(vad.valence());
                a += f64::from(vad.arousal());
                d += f64::from(vad.dominance());
                matched += 1;
            }
        }
        if matched == 0 {
            return Vad::NEUTRAL;
        }
        let n = f64::from(matched);
        Vad::new((v / n) as f32, (a / n) as f32, (d / n) as f32)
    }

    /// Map text to a VAD triple.
    #[must_use]
    pub fn analyze(&self, text: &str) -> Vad {
        let raw = self.lexicon_vad(text);
        let vad = Vad::new(raw.valence() * self.lexicon_weight, raw.arousal(), raw.dominance());
        info!(
            parent: &self.span,
            text = truncate_for_log(text, LOG_TEXT_CHARS),
            valence = vad.valence(),
            arousal = vad.arousal(),
            dominance = vad.dominance(),
            "appraised text"
        );
        vad
    }

    /// VAD plus the six cognitive-appraisal scalars.
    #[must_use]
    pub fn full_appraisal(&self, text: &str) -> AppraisalResult {
        let vad = self.analyze(text);
        let Some(fallback) = &self.fallback else {
            return AppraisalResult::from_vad(vad);
        };

        match fallback.appraise(text, &vad) {
            Ok(cognitive) if cognitive.is_finite() => AppraisalResult::with_cognitive(vad, cognitive),
            Ok(_) => {
                warn!(
                    parent: &self.span,
                    fallback = fallback.name(),
                    "fallback returned non-finite appraisal; deriving locally"
                );
                AppraisalResult::from_vad(vad)
            }
            Err(e) => {
                warn!(
                    parent: &self.span,
                    fallback = fallback.name(),
                    error = %e,
                    "fallback appraisal failed; deriving locally"
                );
                AppraisalResult::from_vad(vad)
            }
        }
    }
}
