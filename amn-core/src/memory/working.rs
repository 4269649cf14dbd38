//! Working Memory: the bounded buffer of recent turns.
//!
//! Newest entries live at the front. Inserting into a full buffer pops the
//! oldest entry and returns it to the caller as an eviction; working memory
//! never forwards anything to the archive itself.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{Span, debug, info};

use crate::config::MemoryConfig;
use crate::decay;
use crate::error::Result;
use crate::memory::MemoryEntry;
use crate::types::{AppraisalResult, MemoryId};

/// Result of inserting a turn into working memory.
#[derive(Debug)]
#[must_use = "an evicted entry is dropped unless it is forwarded to episodic memory"]
pub struct InsertOutcome {
    /// Identifier of the newly stored entry.
    pub id: MemoryId,
    /// The oldest entry, if the insert pushed the buffer over capacity.
    pub evicted: Option<MemoryEntry>,
}

/// Bounded, newest-first buffer of turns.
#[derive(Debug)]
pub struct WorkingMemory {
    entries: VecDeque<MemoryEntry>,
    config: MemoryConfig,
    span: Span,
}

impl WorkingMemory {
    /// Create an empty working memory.
    ///
    /// # Errors
    /// Returns `AmnError::InvalidCapacity` if the configured capacity is zero.
    pub fn new(config: &MemoryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: VecDeque::with_capacity(config.working_capacity + 1),
            config: config.clone(),
            span: Span::none(),
        })
    }

    /// Create an empty working memory with default settings and the given capacity.
    ///
    /// # Errors
    /// Returns `AmnError::InvalidCapacity` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(&MemoryConfig {
            working_capacity: capacity,
            ..MemoryConfig::default()
        })
    }

    /// Parent span for this buffer's log records.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Maximum number of entries held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.working_capacity
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a new turn, stamped with the current wall-clock time.
    pub fn insert(&mut self, content: impl Into<String>, appraisal: AppraisalResult) -> InsertOutcome {
        self.insert_at(content, appraisal, Utc::now())
    }

    /// Store a new turn created at `now`.
    pub fn insert_at(
        &mut self,
        content: impl Into<String>,
        appraisal: AppraisalResult,
        now: DateTime<Utc>,
    ) -> InsertOutcome {
        let importance = self.config.importance_for(appraisal.vad.arousal());
        let entry = MemoryEntry::new(content.into(), appraisal, importance, now);
        let id = entry.id;

        self.entries.push_front(entry);
        let evicted = if self.entries.len() > self.config.working_capacity {
            self.entries.pop_back()
        } else {
            None
        };
        self.decay(now);

        if let Some(old) = &evicted {
            info!(parent: &self.span, evicted = %old.id, "evicted from working memory");
        }
        info!(
            parent: &self.span,
            id = %id,
            importance,
            vad = %appraisal.vad,
            "added to working memory"
        );

        InsertOutcome { id, evicted }
    }

    /// All entries, newest first, after applying decay at the current time.
    pub fn get_all(&mut self) -> &[MemoryEntry] {
        self.get_all_at(Utc::now())
    }

    /// All entries, newest first, after applying decay as of `now`.
    pub fn get_all_at(&mut self, now: DateTime<Utc>) -> &[MemoryEntry] {
        self.decay(now);
        self.entries.make_contiguous()
    }

    /// Entries without touching recency scores.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter()
    }

    fn decay(&mut self, now: DateTime<Utc>) {
        let floor = self.config.recency_floor;
        for entry in &mut self.entries {
            let score = decay::recency_at(entry.timestamp, now, floor);
            let current = entry.recency_score();
            // A clock that steps backwards must not refresh an entry.
            entry.set_recency(score.min(current));
        }
        debug!(parent: &self.span, entries = self.entries.len(), "applied recency decay");
    }
}
