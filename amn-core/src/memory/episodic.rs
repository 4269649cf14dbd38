//! Episodic Memory: the long-term archive of evicted turns.
//!
//! Unbounded and reverse-chronological: every `add` goes to the front.
//! Archived entries are not subject to recency decay; their scores stay
//! frozen at the value they carried when they left working memory.

use std::collections::VecDeque;

use tracing::{Span, info};

use crate::config::ConsolidationConfig;
use crate::memory::MemoryEntry;
use crate::types::MemoryId;

/// Unbounded archive of turns, most recent first.
#[derive(Debug)]
pub struct EpisodicMemory {
    entries: VecDeque<MemoryEntry>,
    gate: ConsolidationConfig,
    span: Span,
}

impl Default for EpisodicMemory {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            gate: ConsolidationConfig::default(),
            span: Span::none(),
        }
    }
}

impl EpisodicMemory {
    /// Create an empty archive with the default consolidation gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom consolidation gate.
    #[must_use]
    pub fn with_gate(mut self, gate: ConsolidationConfig) -> Self {
        self.gate = gate;
        self
    }

    /// Parent span for this archive's log records.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Take ownership of an entry and place it at the front.
    pub fn add(&mut self, entry: MemoryEntry) {
        info!(parent: &self.span, id = %entry.id, "added to episodic memory");
        self.entries.push_front(entry);
    }

    /// The `n` most recent entries (fewer if the archive is smaller).
    pub fn get_recent(&self, n: usize) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter().take(n)
    }

    /// Find an archived entry by id.
    #[must_use]
    pub fn get(&self, id: MemoryId) -> Option<&MemoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Whether the caller should keep this entry for long-term consolidation.
    ///
    /// A pure gate on importance; nothing is moved or removed.
    #[must_use]
    pub fn consolidate(&self, entry: &MemoryEntry) -> bool {
        let passes = self.gate.passes(entry.importance());
        if passes {
            info!(parent: &self.span, id = %entry.id, "consolidation trigger");
        }
        passes
    }

    /// Number of archived entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
