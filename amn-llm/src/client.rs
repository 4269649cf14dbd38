//! LLM Client: unified interface for Ollama and OpenAI-compatible backends.

use std::time::{Duration, Instant};

use amn_core::config::FallbackConfig;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Provider backend for LLM inference.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Ollama running locally (recommended).
    Ollama {
        /// Server root, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible {
        /// API root, without the `/v1` suffix.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// No LLM available: all calls return error, triggering local derivation.
    None,
}

/// The main LLM client that routes requests to the configured backend.
#[derive(Debug)]
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Create a client with no LLM backend (all calls fail).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Build a client from the `[appraisal.fallback]` configuration.
    ///
    /// A disabled fallback yields [`LlmClient::none`]. The OpenAI provider
    /// reads its key from the environment variable named by `api_key_env`.
    ///
    /// # Errors
    /// `LlmError::ConfigError` for an unknown provider or a missing API key.
    pub fn from_config(config: &FallbackConfig) -> Result<Self, LlmError> {
        if !config.enabled {
            return Ok(Self::none());
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let provider = match config.provider.as_str() {
            "ollama" => LlmProvider::Ollama { base_url },
            "openai" => {
                let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                    LlmError::ConfigError(format!("environment variable {} is not set", config.api_key_env))
                })?;
                LlmProvider::OpenAiCompatible { base_url, api_key }
            }
            other => return Err(LlmError::ConfigError(format!("unknown provider '{other}'"))),
        };
        Ok(Self::new(provider, config.model.clone(), config.max_retries))
    }

    /// Generate a response from the LLM.
    ///
    /// Returns `Err` if the LLM is unavailable or all retries fail.
    ///
    /// # Errors
    /// See [`LlmError`].
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::Ollama { base_url } => {
                let url = format!("{base_url}/api/generate");
                let mut body = json!({
                    "model": self.model,
                    "system": request.system,
                    "prompt": request.user,
                    "stream": false,
                    "options": {
                        "temperature": request.temperature,
                        "num_predict": request.max_tokens,
                    }
                });
                if request.json_mode {
                    body["format"] = json!("json");
                }
                self.send_with_retries("ollama", request.timeout_ms, || self.http.post(&url).json(&body), |v| {
                    let text = v["response"].as_str()?.to_string();
                    let tokens = v["eval_count"].as_u64().unwrap_or(0);
                    Some((text, tokens))
                })
                .await
            }
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                let url = format!("{base_url}/v1/chat/completions");
                let mut body = json!({
                    "model": self.model,
                    "messages": [
                        { "role": "system", "content": request.system },
                        { "role": "user", "content": request.user },
                    ],
                    "max_tokens": request.max_tokens,
                    "temperature": request.temperature,
                });
                if request.json_mode {
                    body["response_format"] = json!({ "type": "json_object" });
                }
                self.send_with_retries(
                    "openai",
                    request.timeout_ms,
                    || self.http.post(&url).bearer_auth(api_key).json(&body),
                    |v| {
                        let text = v["choices"][0]["message"]["content"].as_str()?.to_string();
                        let tokens = v["usage"]["completion_tokens"].as_u64().unwrap_or(0);
                        Some((text, tokens))
                    },
                )
                .await
            }
        }
    }

    /// POST with retries; `extract` pulls `(text, tokens)` out of a success body.
    async fn send_with_retries<B, E>(
        &self,
        backend: &'static str,
        timeout_ms: u64,
        build: B,
        extract: E,
    ) -> Result<LlmResponse, LlmError>
    where
        B: Fn() -> RequestBuilder,
        E: Fn(&Value) -> Option<(String, u64)>,
    {
        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(backend, attempt = attempt + 1, max = self.max_retries + 1, "retrying LLM call");
            }

            let start = Instant::now();
            let result = build().timeout(Duration::from_millis(timeout_ms)).send().await;
            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let body: Value = resp.json().await.map_err(|e| LlmError::ParseError(e.to_string()))?;
                    let (text, tokens) = extract(&body)
                        .ok_or_else(|| LlmError::SchemaValidation(format!("unexpected {backend} response shape")))?;
                    return Ok(LlmResponse {
                        text: text.trim().to_string(),
                        tokens_generated: u32::try_from(tokens).unwrap_or(u32::MAX),
                        latency_ms,
                        model: self.model.clone(),
                    });
                }
                Ok(resp) => {
                    let status = resp.status();
                    last_error = format!("HTTP {status}: {}", resp.text().await.unwrap_or_default());
                    warn!(backend, %status, "LLM backend returned error");
                }
                Err(e) if e.is_timeout() => {
                    warn!(backend, timeout_ms, "LLM request timed out");
                    last_error = LlmError::Timeout(timeout_ms).to_string();
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(backend, error = %last_error, "LLM request failed");
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    /// Parse a raw LLM response text as structured JSON.
    ///
    /// Small models often wrap the object in prose or code fences, so the
    /// outermost `{...}` span is extracted first.
    ///
    /// # Errors
    /// `LlmError::ParseError` if no JSON object of type `T` can be found.
    pub fn parse_structured<T: serde::de::DeserializeOwned>(response: &LlmResponse) -> Result<T, LlmError> {
        let raw = response.text.as_str();
        let json = match (raw.find('{'), raw.rfind('}')) {
            (Some(start), Some(end)) if start < end => &raw[start..=end],
            _ => raw,
        };
        serde_json::from_str(json)
            .map_err(|e| LlmError::ParseError(format!("JSON parse error: {e}: raw text: '{raw}'")))
    }

    /// Check if the LLM client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// Model name sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}
