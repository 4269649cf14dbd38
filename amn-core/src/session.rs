//! Conversation session: one turn loop over one working/episodic pair.
//!
//! ```text
//! user input ─► appraise ─► retrieve (WM ∪ EM window) ─► generator
//!                                                           │
//!      EM ◄─ eviction ◄─ WM.insert ◄─ appraise full turn ◄──┘
//! ```
//!
//! The session never builds a final prompt; the [`ResponseGenerator`]
//! receives the query and the ranked memories and decides how to use them.
//! [`format_context`] renders the conventional `PAST:` lines for
//! generators that want plain text.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{Span, info, warn};

use crate::appraisal::{AppraisalEngine, CognitiveFallback};
use crate::config::AmnConfig;
use crate::error::{AmnError, Result};
use crate::logging::{session_span, truncate_for_log};
use crate::memory::{EpisodicMemory, MemoryEntry, WorkingMemory};
use crate::retrieval::{RetrievalEngine, RetrievalResult};
use crate::types::{AppraisalResult, MemoryId};

/// Characters of each memory shown by [`format_context`].
const CONTEXT_PREVIEW_CHARS: usize = 150;

/// Produces the agent's reply for a turn.
pub trait ResponseGenerator {
    /// Failure type; rendered into [`AmnError::Generator`].
    type Error: fmt::Display;

    /// Reply to `query` given the retrieved memories (best first).
    ///
    /// # Errors
    /// Whatever the backing model or service reports.
    fn generate(&mut self, query: &str, memories: &[RetrievalResult]) -> std::result::Result<String, Self::Error>;
}

impl<F> ResponseGenerator for F
where
    F: FnMut(&str, &[RetrievalResult]) -> String,
{
    type Error = std::convert::Infallible;

    fn generate(&mut self, query: &str, memories: &[RetrievalResult]) -> std::result::Result<String, Self::Error> {
        Ok(self(query, memories))
    }
}

/// Everything that happened during one [`Session::step`].
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The generator's reply.
    pub reply: String,
    /// Memories handed to the generator.
    pub retrieved: Vec<RetrievalResult>,
    /// Id of the turn just stored in working memory.
    pub inserted: MemoryId,
    /// Id of the entry moved to episodic memory, if any.
    pub evicted: Option<MemoryId>,
}

/// One conversation's memory and turn loop.
pub struct Session<G> {
    appraisal: AppraisalEngine,
    working: WorkingMemory,
    episodic: EpisodicMemory,
    retrieval: RetrievalEngine,
    generator: G,
    consolidated: Vec<MemoryId>,
    span: Span,
}

impl<G> fmt::Debug for Session<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("appraisal", &self.appraisal)
            .field("working", &self.working.len())
            .field("episodic", &self.episodic.len())
            .field("consolidated", &self.consolidated.len())
            .finish_non_exhaustive()
    }
}

impl<G: ResponseGenerator> Session<G> {
    /// Assemble a session from prebuilt components.
    #[must_use]
    pub fn new(
        appraisal: AppraisalEngine,
        working: WorkingMemory,
        episodic: EpisodicMemory,
        retrieval: RetrievalEngine,
        generator: G,
    ) -> Self {
        Self {
            appraisal,
            working,
            episodic,
            retrieval,
            generator,
            consolidated: Vec::new(),
            span: Span::none(),
        }
    }

    /// Build every component from configuration, logging under a span
    /// named after `session_id`.
    ///
    /// The external appraisal fallback is not constructed here even when
    /// `appraisal.fallback.enabled` is set; attach it with
    /// [`Session::with_fallback`].
    ///
    /// # Errors
    /// Any configuration or lexicon loading error.
    pub fn from_config(config: &AmnConfig, session_id: &str, generator: G) -> Result<Self> {
        config.validate()?;
        let span = session_span(session_id);

        if !config.consolidation.is_reachable(&config.memory) {
            warn!(
                parent: &span,
                threshold = config.consolidation.threshold,
                inclusive = config.consolidation.inclusive,
                "consolidation gate can never pass with the configured importance levels"
            );
        }

        if config.appraisal.fallback.enabled {
            warn!(
                parent: &span,
                provider = %config.appraisal.fallback.provider,
                model = %config.appraisal.fallback.model,
                "appraisal fallback is enabled but not attached; build one (e.g. amn_llm::LlmAppraisalFallback::from_config) and pass it to Session::with_fallback"
            );
        }

        let appraisal = AppraisalEngine::from_config(&config.appraisal)?.with_span(span.clone());
        let working = WorkingMemory::new(&config.memory)?.with_span(span.clone());
        let episodic = EpisodicMemory::new()
            .with_gate(config.consolidation.clone())
            .with_span(span.clone());
        let retrieval = RetrievalEngine::new(config.retrieval.clone())?
            .with_episodic_window(config.memory.episodic_window)
            .with_span(span.clone());

        let mut session = Self::new(appraisal, working, episodic, retrieval, generator);
        session.span = span;
        Ok(session)
    }

    /// Consult `fallback` for cognitive appraisal scalars.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Box<dyn CognitiveFallback>) -> Self {
        self.appraisal = self.appraisal.with_fallback(fallback);
        self
    }

    /// Run one conversational turn.
    ///
    /// # Errors
    /// `AmnError::Generator` if the response generator fails; memory is
    /// left untouched in that case.
    pub fn step(&mut self, user_input: &str) -> Result<TurnOutcome> {
        let query = self.appraisal.full_appraisal(user_input);
        let retrieved = self
            .retrieval
            .retrieve(&mut self.working, &self.episodic, user_input, &query);

        let reply = self
            .generator
            .generate(user_input, &retrieved)
            .map_err(|e| AmnError::Generator(e.to_string()))?;

        let full_turn = format!("User: {user_input}\nAgent: {reply}");
        let turn_appraisal = self.appraisal.full_appraisal(&full_turn);
        let (inserted, evicted) = self.remember(full_turn, turn_appraisal);

        info!(
            parent: &self.span,
            reply = truncate_for_log(&reply, 50),
            retrieved = retrieved.len(),
            "turn complete"
        );
        Ok(TurnOutcome {
            reply,
            retrieved,
            inserted,
            evicted,
        })
    }

    /// Store a turn directly, bypassing retrieval and generation.
    pub fn remember(&mut self, content: String, appraisal: AppraisalResult) -> (MemoryId, Option<MemoryId>) {
        let outcome = self.working.insert(content, appraisal);
        let evicted = outcome.evicted.map(|entry| self.archive(entry));
        (outcome.id, evicted)
    }

    fn archive(&mut self, entry: MemoryEntry) -> MemoryId {
        let id = entry.id;
        if self.episodic.consolidate(&entry) {
            self.consolidated.push(id);
        }
        self.episodic.add(entry);
        id
    }

    /// Ids of archived entries that passed the consolidation gate, oldest first.
    #[must_use]
    pub fn consolidated(&self) -> &[MemoryId] {
        &self.consolidated
    }

    /// Working memory.
    #[must_use]
    pub fn working(&self) -> &WorkingMemory {
        &self.working
    }

    /// Episodic memory.
    #[must_use]
    pub fn episodic(&self) -> &EpisodicMemory {
        &self.episodic
    }

    /// Appraisal engine.
    #[must_use]
    pub fn appraisal(&self) -> &AppraisalEngine {
        &self.appraisal
    }

    /// Response generator.
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }
}

/// Render retrieved memories as `PAST:` context lines, best first.
#[must_use]
pub fn format_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|r| {
            let preview = truncate_for_log(&r.memory.content, CONTEXT_PREVIEW_CHARS);
            format!("PAST: {preview}... [VAD:{}] (score:{})", r.memory.vad(), r.score)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

/// A session behind a mutex, for hosts that serve turns from several threads.
///
/// Turns for one session are serialized; separate sessions share nothing.
pub struct SharedSession<G> {
    inner: Arc<Mutex<Session<G>>>,
}

impl<G> Clone for SharedSession<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: ResponseGenerator> SharedSession<G> {
    /// Wrap a session.
    #[must_use]
    pub fn new(session: Session<G>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Run one turn while holding the session lock.
    ///
    /// # Errors
    /// See [`Session::step`].
    pub fn step(&self, user_input: &str) -> Result<TurnOutcome> {
        self.inner.lock().step(user_input)
    }

    /// Lock the session for direct inspection.
    pub fn lock(&self) -> MutexGuard<'_, Session<G>> {
        self.inner.lock()
    }
}
