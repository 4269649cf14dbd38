//! # AMN Core Library
//!
//! Affective memory for conversational agents. Every turn is appraised
//! emotionally and stored in a two-tier memory; later turns retrieve past
//! turns that are relevant in meaning *and* in feeling:
//!
//! - **Appraisal**: text → VAD (Russell & Mehrabian PAD model, 1977) via a
//!   word lexicon, plus six cognitive-appraisal scalars (Scherer, 2001)
//! - **Working memory**: the last few turns, with hyperbolic recency decay
//! - **Episodic memory**: every turn evicted from working memory
//! - **Retrieval**: semantic, emotional, goal, peak-end (Kahneman, 1993),
//!   and recency factors combined under validated weights
//!
//! A [`Session`] wires the pieces into a turn loop around an external
//! [`ResponseGenerator`].
//!
//! ## Performance Contract
//!
//! A turn is single-threaded and synchronous:
//! - Appraisal: linear in the number of tokens
//! - Retrieval: linear in candidates (working memory + episodic window)
//! - The only blocking call is the optional appraisal fallback, bounded by
//!   its own timeout

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

pub mod appraisal;
pub mod config;
pub mod decay;
pub mod error;
pub mod logging;
pub mod memory;
pub mod retrieval;
pub mod session;
pub mod text;
pub mod types;

pub use appraisal::{AppraisalEngine, CognitiveFallback, FallbackError, Lexicon};
pub use config::AmnConfig;
pub use error::{AmnError, Result};
pub use memory::{EpisodicMemory, InsertOutcome, MemoryEntry, WorkingMemory};
pub use retrieval::{RetrievalEngine, RetrievalResult, ScoreBreakdown};
pub use session::{ResponseGenerator, Session, SharedSession, TurnOutcome, format_context};
pub use types::*;
