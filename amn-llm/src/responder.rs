//! LLM-backed reply generation for [`amn_core::Session`].

use std::time::Duration;

use amn_core::{ResponseGenerator, RetrievalResult, format_context};

use crate::blocking::BlockingLlm;
use crate::client::LlmClient;
use crate::error::LlmError;
use crate::prompt;
use crate::types::LlmRequest;

/// Default overall deadline for one reply.
pub const DEFAULT_REPLY_DEADLINE: Duration = Duration::from_secs(30);

/// Generates empathetic replies from the retrieved memories.
#[derive(Debug)]
pub struct LlmResponder {
    llm: BlockingLlm,
    max_tokens: u32,
    temperature: f32,
}

impl LlmResponder {
    /// Wrap a client with the default deadline.
    ///
    /// # Errors
    /// `LlmError::ConfigError` if the runtime cannot be created.
    pub fn new(client: LlmClient) -> Result<Self, LlmError> {
        Ok(Self {
            llm: BlockingLlm::new(client, DEFAULT_REPLY_DEADLINE)?,
            max_tokens: 200,
            temperature: 0.7,
        })
    }

    /// Generation budget per reply.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the chat request for one turn.
    #[must_use]
    pub fn request(&self, query: &str, memories: &[RetrievalResult]) -> LlmRequest {
        let context = format_context(memories);
        let user = prompt::render(prompt::RESPONSE_USER, &[("memories", context.as_str()), ("input", query)]);
        let mut request = LlmRequest::chat(prompt::RESPONSE_SYSTEM, user);
        request.max_tokens = self.max_tokens;
        request.temperature = self.temperature;
        request
    }
}

impl ResponseGenerator for LlmResponder {
    type Error = LlmError;

    fn generate(&mut self, query: &str, memories: &[RetrievalResult]) -> Result<String, LlmError> {
        self.llm.call(&self.request(query, memories)).map(|r| r.text)
    }
}
