//! Adapter for historical memory-record shapes.
//!
//! Older exports stored the emotional triple directly on the record
//! (`"vad": [v, a, d]` or `"vad": {"valence": .., ..}`) instead of under
//! `appraisal.vad`, and sometimes omitted importance and recency. Such
//! records are normalised into the canonical [`MemoryEntry`] on load so the
//! rest of the system only ever sees one shape.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::MemoryConfig;
use crate::error::{AmnError, Result};
use crate::memory::MemoryEntry;
use crate::types::{AppraisalResult, MemoryId, Vad};

/// Any supported on-disk record shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LegacyRecord {
    /// Current schema.
    Canonical(MemoryEntry),
    /// Flat schema with a top-level `vad` field.
    Flat(FlatRecord),
}

/// Historical record with the VAD stored directly on the entry.
#[derive(Debug, Deserialize)]
pub struct FlatRecord {
    #[serde(default)]
    id: Option<Uuid>,
    content: String,
    vad: LegacyVad,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    recency_score: Option<f32>,
    #[serde(default)]
    importance: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyVad {
    Triple(f32, f32, f32),
    Named {
        valence: f32,
        arousal: f32,
        dominance: f32,
    },
}

impl LegacyVad {
    fn into_vad(self) -> Vad {
        match self {
            Self::Triple(v, a, d) | Self::Named { valence: v, arousal: a, dominance: d } => {
                Vad::new(v, a, d)
            }
        }
    }
}

impl LegacyRecord {
    /// Parse a JSON record of either shape.
    ///
    /// # Errors
    /// Returns `AmnError::Serialization` if the JSON matches neither shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AmnError::Serialization(e.to_string()))
    }

    /// Normalise into the canonical entry. Missing or non-finite importance
    /// is recomputed with the peak-end rule from `config`; importance is
    /// clamped to `[0, 1]` and recency to `[recency_floor, 1]` for every
    /// shape, canonical records included.
    ///
    /// # Errors
    /// Returns the validation error if `config` is invalid.
    pub fn into_entry(self, config: &MemoryConfig) -> Result<MemoryEntry> {
        config.validate()?;
        let (mut entry, importance, recency) = match self {
            Self::Canonical(entry) => {
                let (importance, recency) = (entry.importance, entry.recency_score);
                (entry, Some(importance), Some(recency))
            }
            Self::Flat(flat) => {
                let mut entry = MemoryEntry::new(
                    flat.content,
                    AppraisalResult::from_vad(flat.vad.into_vad()),
                    0.0,
                    flat.timestamp,
                );
                if let Some(id) = flat.id {
                    entry.id = MemoryId(id);
                }
                (entry, flat.importance, flat.recency_score)
            }
        };

        entry.importance = match importance {
            Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
            _ => config.importance_for(entry.vad().arousal()),
        };
        let recency = recency.filter(|r| r.is_finite()).unwrap_or(1.0);
        entry.set_recency(recency.clamp(config.recency_floor, 1.0));
        Ok(entry)
    }
}
