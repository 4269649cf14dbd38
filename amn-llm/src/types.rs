//! Core types for LLM requests and responses.

use amn_core::CognitiveAppraisal;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// A request to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    /// System prompt (role, rules, constraints).
    pub system: String,
    /// User prompt (context, memories, instructions).
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Ask the backend to constrain output to a JSON object.
    pub json_mode: bool,
    /// Per-attempt HTTP timeout in milliseconds.
    pub timeout_ms: u64,
}

impl LlmRequest {
    /// A structured request: low temperature, JSON output, short budget.
    #[must_use]
    pub fn structured(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 120,
            temperature: 0.0,
            json_mode: true,
            timeout_ms: 5000,
        }
    }

    /// A free-text conversational request.
    #[must_use]
    pub fn chat(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 200,
            temperature: 0.7,
            json_mode: false,
            timeout_ms: 30_000,
        }
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A response from the LLM.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmResponse {
    /// The generated text.
    pub text: String,
    /// How many tokens were generated.
    pub tokens_generated: u32,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model was used.
    pub model: String,
}

/// Structured appraisal output: the six cognitive scalars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AppraisalResponse {
    /// How much the event matters to the speaker's goals (-1.0 to 1.0).
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

impl TryFrom<AppraisalResponse> for CognitiveAppraisal {
    type Error = LlmError;

    fn try_from(r: AppraisalResponse) -> Result<Self, Self::Error> {
        let appraisal = CognitiveAppraisal {
            goal_relevance: r.goal_relevance,
            agency: r.agency,
            certainty: r.certainty,
            novelty: r.novelty,
            pleasantness: r.pleasantness,
            control: r.control,
        };
        if appraisal.is_finite() {
            Ok(appraisal)
        } else {
            Err(LlmError::SchemaValidation("appraisal contains non-finite values".into()))
        }
    }
}
