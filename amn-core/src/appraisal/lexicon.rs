//! Word → VAD lexicon.
//!
//! Loaded once at engine construction from a CSV table with the header
//! `Word,Valence,Arousal,Dominance` (the Warriner-style layout), or built
//! directly from in-memory entries. Lookups are case-insensitive.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AmnError, Result};
use crate::types::Vad;

/// A validated word → VAD table.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashMap<String, Vad>,
}

#[derive(Debug, Deserialize)]
struct LexiconRow {
    #[serde(rename = "Word", alias = "word")]
    word: String,
    #[serde(rename = "Valence", alias = "valence")]
    valence: f32,
    #[serde(rename = "Arousal", alias = "arousal")]
    arousal: f32,
    #[serde(rename = "Dominance", alias = "dominance")]
    dominance: f32,
}

impl Lexicon {
    /// Build a lexicon from `(word, valence, arousal, dominance)` entries.
    ///
    /// # Errors
    /// Returns `AmnError::LexiconRow` (numbered from 1 in iteration order)
    /// for an empty word or an out-of-range component.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f32, f32, f32)>,
        S: AsRef<str>,
    {
        let mut words = HashMap::new();
        for (i, (word, v, a, d)) in entries.into_iter().enumerate() {
            let (word, vad) = validate_row(word.as_ref(), v, a, d, i as u64 + 1)?;
            words.insert(word, vad);
        }
        Ok(Self { words })
    }

    /// Load a CSV lexicon from disk.
    ///
    /// # Errors
    /// Returns `AmnError::LexiconNotFound` if the file does not exist, or
    /// any parse/validation error from [`Lexicon::from_reader`].
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AmnError::LexiconNotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a CSV lexicon from any reader.
    ///
    /// # Errors
    /// Returns `AmnError::Csv` for malformed CSV and `AmnError::LexiconRow`
    /// for rows whose values fall outside the documented ranges.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut words = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);
            let row: LexiconRow = record.deserialize(Some(&headers))?;
            let (word, vad) = validate_row(&row.word, row.valence, row.arousal, row.dominance, line)?;
            words.insert(word, vad);
        }
        Ok(Self { words })
    }

    /// Look up a word (case-insensitive).
    #[must_use]
    pub fn get(&self, word: &str) -> Option<Vad> {
        match self.words.get(word) {
            Some(vad) => Some(*vad),
            None => self.words.get(&word.to_lowercase()).copied(),
        }
    }

    /// Number of words in the lexicon.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the lexicon has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn validate_row(word: &str, v: f32, a: f32, d: f32, line: u64) -> Result<(String, Vad)> {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Err(AmnError::LexiconRow {
            line,
            reason: "empty word".to_string(),
        });
    }
    let checks = [
        ("valence", v, -1.0, 1.0),
        ("arousal", a, 0.0, 1.0),
        ("dominance", d, 0.0, 1.0),
    ];
    for (name, value, min, max) in checks {
        if !value.is_finite() || value < min || value > max {
            return Err(AmnError::LexiconRow {
                line,
                reason: format!("{name} {value} for '{word}' outside [{min}, {max}]"),
            });
        }
    }
    Ok((word, Vad::new(v, a, d)))
}
