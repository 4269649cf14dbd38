//! LLM-backed cognitive appraisal.
//!
//! Plugs into [`amn_core::AppraisalEngine::with_fallback`]. Any failure
//! (unreachable server, timeout, malformed or non-finite output) is
//! reported as a [`FallbackError`] and the engine derives the scalars
//! locally instead.

use std::time::Duration;

use amn_core::appraisal::{CognitiveFallback, FallbackError};
use amn_core::config::FallbackConfig;
use amn_core::{CognitiveAppraisal, Vad};
use tracing::debug;

use crate::blocking::BlockingLlm;
use crate::client::LlmClient;
use crate::error::LlmError;
use crate::prompt;
use crate::types::{AppraisalResponse, LlmRequest};

/// Asks a language model for the six cognitive-appraisal scalars.
#[derive(Debug)]
pub struct LlmAppraisalFallback {
    llm: BlockingLlm,
}

impl LlmAppraisalFallback {
    /// Wrap a client; each appraisal is abandoned after `timeout`.
    ///
    /// # Errors
    /// `LlmError::ConfigError` if the runtime cannot be created.
    pub fn new(client: LlmClient, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            llm: BlockingLlm::new(client, timeout)?,
        })
    }

    /// Build from `[appraisal.fallback]`. Returns `Ok(None)` when disabled.
    ///
    /// # Errors
    /// Any client configuration error.
    pub fn from_config(config: &FallbackConfig) -> Result<Option<Self>, LlmError> {
        if !config.enabled {
            return Ok(None);
        }
        let client = LlmClient::from_config(config)?;
        Self::new(client, Duration::from_millis(config.timeout_ms)).map(Some)
    }

    /// Render the appraisal request for `text`.
    #[must_use]
    pub fn request(&self, text: &str, vad: &Vad) -> LlmRequest {
        let valence = format!("{:.2}", vad.valence());
        let arousal = format!("{:.2}", vad.arousal());
        let dominance = format!("{:.2}", vad.dominance());
        let user = prompt::render(prompt::APPRAISAL_USER, &[
            ("text", text),
            ("valence", valence.as_str()),
            ("arousal", arousal.as_str()),
            ("dominance", dominance.as_str()),
        ]);
        let timeout_ms = u64::try_from(self.llm.deadline().as_millis()).unwrap_or(u64::MAX);
        LlmRequest::structured(prompt::APPRAISAL_SYSTEM, user).with_timeout(timeout_ms)
    }
}

/// Parse model output into validated appraisal scalars.
///
/// # Errors
/// `LlmError::ParseError` for text that holds no matching JSON object,
/// `LlmError::SchemaValidation` for non-finite values.
pub fn parse_appraisal(text: &str) -> Result<CognitiveAppraisal, LlmError> {
    let response = crate::types::LlmResponse {
        text: text.to_string(),
        tokens_generated: 0,
        latency_ms: 0,
        model: String::new(),
    };
    let parsed: AppraisalResponse = LlmClient::parse_structured(&response)?;
    CognitiveAppraisal::try_from(parsed)
}

impl CognitiveFallback for LlmAppraisalFallback {
    fn appraise(&self, text: &str, vad: &Vad) -> Result<CognitiveAppraisal, FallbackError> {
        let response = self.llm.call(&self.request(text, vad))?;
        debug!(
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = response.tokens_generated,
            "appraisal fallback responded"
        );
        Ok(parse_appraisal(&response.text)?)
    }

    fn name(&self) -> &str {
        self.llm.client().model()
    }
}
