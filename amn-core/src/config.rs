//! Configuration for the affective memory system.
//!
//! Maps directly to `amn.toml`. Every field has a documented default, so
//! an empty file (or no file at all) yields the reference configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AmnError, Result};

/// Tolerance when checking that retrieval weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmnConfig {
    /// Working/episodic memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Retrieval algorithm settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Appraisal engine settings.
    #[serde(default)]
    pub appraisal: AppraisalConfig,
    /// Consolidation gate settings.
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AmnConfig {
    /// Load configuration from a TOML string and validate it.
    ///
    /// # Errors
    /// Returns `AmnError::Config` if the TOML is invalid, or any validation
    /// error from [`AmnConfig::validate`].
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| AmnError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check every setting that must fail fast at startup.
    ///
    /// # Errors
    /// Returns the first configuration error found.
    pub fn validate(&self) -> Result<()> {
        self.memory.validate()?;
        self.retrieval.validate()?;
        if let Some(path) = &self.appraisal.lexicon_path {
            if !path.exists() {
                return Err(AmnError::LexiconNotFound(path.clone()));
            }
        }
        if !self.appraisal.lexicon_weight.is_finite() {
            return Err(AmnError::Config("lexicon_weight must be finite".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Working and episodic memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of entries held in working memory.
    #[serde(default = "default_5_usize")]
    pub working_capacity: usize,
    /// How many of the most recent episodic entries retrieval scans.
    #[serde(default = "default_50")]
    pub episodic_window: usize,
    /// Arousal above which a turn is a peak moment.
    #[serde(default = "default_0_7")]
    pub peak_arousal_threshold: f32,
    /// Importance assigned to peak moments.
    #[serde(default = "default_1_0")]
    pub high_importance: f32,
    /// Importance assigned to everything else.
    #[serde(default = "default_0_5")]
    pub low_importance: f32,
    /// Lower bound of the recency decay curve.
    #[serde(default = "default_0_1")]
    pub recency_floor: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            working_capacity: 5,
            episodic_window: 50,
            peak_arousal_threshold: 0.7,
            high_importance: 1.0,
            low_importance: 0.5,
            recency_floor: 0.1,
        }
    }
}

impl MemoryConfig {
    /// # Errors
    /// Returns `AmnError::InvalidCapacity` if the working capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.working_capacity == 0 {
            return Err(AmnError::InvalidCapacity {
                setting: "working_capacity",
                value: 0,
            });
        }
        if !(0.0..=1.0).contains(&self.recency_floor) {
            return Err(AmnError::Config(format!(
                "recency_floor must lie in [0, 1] (got {})",
                self.recency_floor
            )));
        }
        Ok(())
    }

    /// Peak-end importance for a turn with the given arousal.
    #[must_use]
    pub fn importance_for(&self, arousal: f32) -> f32 {
        if arousal > self.peak_arousal_threshold {
            self.high_importance
        } else {
            self.low_importance
        }
    }
}

/// How emotional resonance compares query and memory valence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResonanceMode {
    /// Similar feelings resonate.
    #[default]
    Similarity,
    /// Distressed queries resonate with opposite-valence memories (reframing).
    Complementary,
}

/// Memory retrieval algorithm settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of memories returned per query.
    #[serde(default = "default_3_usize")]
    pub top_k: usize,
    /// Retrieval weight tuning.
    #[serde(default)]
    pub weights: RetrievalWeights,
    /// Emotional resonance mode.
    #[serde(default)]
    pub resonance_mode: ResonanceMode,
    /// Query valence below which the query counts as distress.
    #[serde(default = "default_distress")]
    pub distress_threshold: f32,
    /// Average goal alignment with agency alignment.
    #[serde(default = "default_true")]
    pub agency_alignment: bool,
    /// Vocabulary cap for the TF-IDF vectorizer.
    #[serde(default = "default_1000")]
    pub max_features: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            weights: RetrievalWeights::default(),
            resonance_mode: ResonanceMode::Similarity,
            distress_threshold: -0.2,
            agency_alignment: true,
            max_features: 1000,
        }
    }
}

impl RetrievalConfig {
    /// # Errors
    /// Returns `AmnError::InvalidCapacity` for a zero `top_k` or
    /// `max_features`, and `AmnError::InvalidWeights` for bad weights.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(AmnError::InvalidCapacity {
                setting: "top_k",
                value: 0,
            });
        }
        if self.max_features == 0 {
            return Err(AmnError::InvalidCapacity {
                setting: "max_features",
                value: 0,
            });
        }
        self.weights.validate()
    }
}

/// One of the five retrieval factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Bag-of-words similarity.
    Semantic,
    /// Emotional resonance.
    Emotional,
    /// Goal/agency alignment.
    Goal,
    /// Peak-end importance.
    PeakEnd,
    /// Recency decay.
    Recency,
}

/// Retrieval scoring weights: must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalWeights {
    /// Weight for semantic similarity.
    #[serde(default = "default_0_25")]
    pub semantic: f64,
    /// Weight for emotional resonance.
    #[serde(default = "default_0_30")]
    pub emotional: f64,
    /// Weight for goal alignment.
    #[serde(default = "default_0_20")]
    pub goal: f64,
    /// Weight for peak-end importance.
    #[serde(default = "default_0_15")]
    pub peak_end: f64,
    /// Weight for recency.
    #[serde(default = "default_0_10")]
    pub recency: f64,
}

impl Default for RetrievalWeights {
    fn default() -> Self {
        Self {
            semantic: 0.25,
            emotional: 0.30,
            goal: 0.20,
            peak_end: 0.15,
            recency: 0.10,
        }
    }
}

impl RetrievalWeights {
    /// Sum of all five weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.semantic + self.emotional + self.goal + self.peak_end + self.recency
    }

    /// Weight of a single factor.
    #[must_use]
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Semantic => self.semantic,
            Factor::Emotional => self.emotional,
            Factor::Goal => self.goal,
            Factor::PeakEnd => self.peak_end,
            Factor::Recency => self.recency,
        }
    }

    /// # Errors
    /// Returns `AmnError::InvalidWeights` if any weight is negative or
    /// non-finite, or the weights do not sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        let all = [self.semantic, self.emotional, self.goal, self.peak_end, self.recency];
        let sum = self.sum();
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AmnError::InvalidWeights { sum });
        }
        Ok(())
    }

    /// Ablation preset: drop one factor and renormalise the remaining four
    /// proportionally so the weights still sum to 1.0.
    #[must_use]
    pub fn without(&self, factor: Factor) -> Self {
        let remaining = self.sum() - self.get(factor);
        if remaining <= f64::EPSILON {
            return *self;
        }
        let scale = |f: Factor| {
            if f == factor { 0.0 } else { self.get(f) / remaining }
        };
        Self {
            semantic: scale(Factor::Semantic),
            emotional: scale(Factor::Emotional),
            goal: scale(Factor::Goal),
            peak_end: scale(Factor::PeakEnd),
            recency: scale(Factor::Recency),
        }
    }

    /// Plain bag-of-words retrieval, for baseline comparisons.
    #[must_use]
    pub fn semantic_only() -> Self {
        Self {
            semantic: 1.0,
            emotional: 0.0,
            goal: 0.0,
            peak_end: 0.0,
            recency: 0.0,
        }
    }
}

/// Appraisal engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalConfig {
    /// CSV lexicon (`Word,Valence,Arousal,Dominance`). `None` means the
    /// caller supplies the lexicon table directly.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
    /// Multiplier applied to the lexicon valence.
    #[serde(default = "default_1_0")]
    pub lexicon_weight: f32,
    /// Optional external language-model fallback.
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl Default for AppraisalConfig {
    fn default() -> Self {
        Self {
            lexicon_path: None,
            lexicon_weight: 1.0,
            fallback: FallbackConfig::default(),
        }
    }
}

/// External language-model fallback for cognitive appraisal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Whether to consult the external model at all.
    #[serde(default)]
    pub enabled: bool,
    /// Provider: "ollama" or "openai".
    #[serde(default = "default_ollama")]
    pub provider: String,
    /// Base URL for the LLM API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key (OpenAI-compatible only).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Hard timeout for the whole fallback call in milliseconds.
    #[serde(default = "default_5000")]
    pub timeout_ms: u64,
    /// Retries before giving up and deriving locally.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "tinyllama".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_ms: 5000,
            max_retries: 0,
        }
    }
}

/// Episodic consolidation gate.
///
/// The reference gate is `importance > 0.8`. With the default importance
/// levels (0.5 / 1.0) only peak moments pass; configurations where no
/// importance level can pass are reported by [`ConsolidationConfig::is_reachable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    /// Importance threshold.
    #[serde(default = "default_0_8")]
    pub threshold: f32,
    /// Use `>=` instead of `>`.
    #[serde(default)]
    pub inclusive: bool,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            inclusive: false,
        }
    }
}

impl ConsolidationConfig {
    /// Whether an entry with this importance passes the gate.
    #[must_use]
    pub fn passes(&self, importance: f32) -> bool {
        if self.inclusive {
            importance >= self.threshold
        } else {
            importance > self.threshold
        }
    }

    /// Whether any importance level the memory config can produce passes.
    #[must_use]
    pub fn is_reachable(&self, memory: &MemoryConfig) -> bool {
        self.passes(memory.high_importance) || self.passes(memory.low_importance)
    }
}

/// Log output settings, consumed by [`crate::logging::build_dispatch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive: trace, debug, info, warn, error, or an `EnvFilter` string.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_ollama() -> String { "ollama".to_string() }
fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "tinyllama".to_string() }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
fn default_distress() -> f32 { -0.2 }
fn default_0_1() -> f32 { 0.1 }
fn default_0_5() -> f32 { 0.5 }
fn default_0_7() -> f32 { 0.7 }
fn default_0_8() -> f32 { 0.8 }
fn default_1_0() -> f32 { 1.0 }
fn default_0_10() -> f64 { 0.10 }
fn default_0_15() -> f64 { 0.15 }
fn default_0_20() -> f64 { 0.20 }
fn default_0_25() -> f64 { 0.25 }
fn default_0_30() -> f64 { 0.30 }
fn default_3_usize() -> usize { 3 }
fn default_5_usize() -> usize { 5 }
fn default_50() -> usize { 50 }
fn default_1000() -> usize { 1000 }
fn default_5000() -> u64 { 5000 }
