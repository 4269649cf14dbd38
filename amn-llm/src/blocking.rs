//! Synchronous bridge over the async [`LlmClient`].
//!
//! The core runs each turn synchronously, so LLM calls are driven to
//! completion on a private current-thread runtime under a hard deadline.
//! Nothing is left pending once a call returns: on timeout the request
//! future is dropped.

use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// An [`LlmClient`] with its own runtime and an overall deadline per call.
#[derive(Debug)]
pub struct BlockingLlm {
    client: LlmClient,
    runtime: Runtime,
    deadline: Duration,
}

impl BlockingLlm {
    /// Wrap `client`; every call is abandoned after `deadline`, retries included.
    ///
    /// # Errors
    /// `LlmError::ConfigError` if the runtime cannot be created.
    pub fn new(client: LlmClient, deadline: Duration) -> Result<Self, LlmError> {
        let runtime = Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build runtime: {e}")))?;
        Ok(Self {
            client,
            runtime,
            deadline,
        })
    }

    /// The wrapped client.
    #[must_use]
    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    /// The overall deadline per call.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `request` to completion or until the deadline.
    ///
    /// # Errors
    /// `LlmError::Timeout` past the deadline, `LlmError::Unavailable` when
    /// called from inside an async runtime, or any client error.
    pub fn call(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        if !self.client.is_available() {
            return Err(LlmError::Unavailable("No LLM provider configured".into()));
        }
        if Handle::try_current().is_ok() {
            return Err(LlmError::Unavailable(
                "blocking LLM call made from inside an async runtime".into(),
            ));
        }
        let deadline_ms = u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX);
        self.runtime.block_on(async {
            match tokio::time::timeout(self.deadline, self.client.generate(request)).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(deadline_ms)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backend_fails_fast() {
        let llm = BlockingLlm::new(LlmClient::none(), Duration::from_millis(50)).expect("runtime");
        let err = llm.call(&LlmRequest::chat("s", "u")).expect_err("no backend");
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[tokio::test]
    async fn refuses_to_block_inside_a_runtime() {
        let llm = BlockingLlm::new(
            LlmClient::new(
                crate::client::LlmProvider::Ollama {
                    base_url: "http://127.0.0.1:9".to_string(),
                },
                "tinyllama",
                0,
            ),
            Duration::from_millis(50),
        )
        .expect("runtime");
        let err = llm.call(&LlmRequest::chat("s", "u")).expect_err("inside runtime");
        assert!(matches!(err, LlmError::Unavailable(_)));
        // Dropping a runtime inside another runtime panics; hand it off.
        std::thread::spawn(move || drop(llm)).join().expect("drop off-runtime");
    }
}
