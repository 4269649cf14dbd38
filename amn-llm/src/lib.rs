//! # amn-llm: LLM boundary for AMN
//!
//! Everything that talks to a language model lives here, outside the core:
//!   - **Ollama** (local, recommended default)
//!   - **OpenAI-compatible API**
//!
//! Two integrations plug into `amn-core`:
//!   - [`LlmAppraisalFallback`] implements `CognitiveFallback` for the
//!     appraisal engine
//!   - [`LlmResponder`] implements `ResponseGenerator` for sessions
//!
//! # Architecture
//!
//! ```text
//! Session turn (sync) ──► BlockingLlm ──► current-thread runtime
//!                              │               │
//!                        deadline timer    LlmClient (reqwest, retries)
//! ```
//!
//! Failures never escape as panics: the appraisal fallback degrades to
//! local derivation, and reply failures surface as session errors.

pub mod blocking;
pub mod client;
pub mod error;
pub mod fallback;
pub mod prompt;
pub mod responder;
pub mod types;

pub use blocking::BlockingLlm;
pub use client::{LlmClient, LlmProvider};
pub use error::LlmError;
pub use fallback::LlmAppraisalFallback;
pub use responder::LlmResponder;
pub use types::{AppraisalResponse, LlmRequest, LlmResponse};
