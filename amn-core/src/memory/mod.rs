//! Two-tier conversational memory.
//!
//! - [`WorkingMemory`]: bounded, newest-first buffer of recent turns.
//! - [`EpisodicMemory`]: unbounded archive of turns evicted from working memory.
//!
//! A [`MemoryEntry`] is created by working memory and owned by it until it
//! is evicted; the eviction hands the entry back to the caller by value, who
//! moves it into the archive. No entry is ever held by both tiers.

pub mod episodic;
pub mod legacy;
pub mod working;

pub use episodic::EpisodicMemory;
pub use legacy::LegacyRecord;
pub use working::{InsertOutcome, WorkingMemory};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AppraisalResult, MemoryId, Vad};

/// One stored conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique identifier.
    pub id: MemoryId,
    /// Full turn text (user input and agent reply).
    pub content: String,
    /// Emotional and cognitive appraisal of the turn.
    pub appraisal: AppraisalResult,
    /// When the turn was stored.
    pub timestamp: DateTime<Utc>,
    /// 1.0 = just stored, decays toward the floor while in working memory.
    recency_score: f32,
    /// Peak-end weight, fixed at creation.
    importance: f32,
}

impl MemoryEntry {
    pub(crate) fn new(
        content: String,
        appraisal: AppraisalResult,
        importance: f32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MemoryId::new(),
            content,
            appraisal,
            timestamp,
            recency_score: 1.0,
            importance,
        }
    }

    /// Emotional triple of the turn.
    #[must_use]
    pub fn vad(&self) -> Vad {
        self.appraisal.vad
    }

    /// Current recency score.
    #[must_use]
    pub fn recency_score(&self) -> f32 {
        self.recency_score
    }

    /// Peak-end importance.
    #[must_use]
    pub fn importance(&self) -> f32 {
        self.importance
    }

    pub(crate) fn set_recency(&mut self, score: f32) {
        self.recency_score = score;
    }
}
