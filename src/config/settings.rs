//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::score::{Aggregation, ScorerConfig};

use super::AppPaths;

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

/// Where the evaluation database lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit database file path — `None` means the platform data
    /// directory (see [`AppPaths`]).
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper transcription engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// GGML model name / file stem (e.g. `"ggml-base"`), resolved inside the
    /// models directory.
    pub model: String,
    /// Speech language hint as an ISO-639-1 code, or `"auto"` to let
    /// Whisper detect the language.
    pub language: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "ggml-base".into(),
            language: "en".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for audio capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Length of one recorded attempt in seconds.
    pub record_secs: u32,
    /// Sample rate of the stored recording in Hz.
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            record_secs: 5,
            sample_rate: 44_100,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for spoken prompt playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Platform voice identifier — `None` uses the system default.
    pub voice: Option<String>,
    /// Speaking rate in words per minute.
    pub rate: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 180,
        }
    }
}

// ---------------------------------------------------------------------------
// ScoringConfig
// ---------------------------------------------------------------------------

/// Aggregation policies and pass thresholds for both scoring call sites.
///
/// The evaluation path and the comparator-fallback path historically
/// disagreed on both knobs (mean/80 vs max/85), so each is configured
/// separately instead of being silently unified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Aggregation for direct scoring.
    pub aggregation: Aggregation,
    /// Pass threshold for direct scoring.
    pub pass_threshold: u8,
    /// Aggregation for the normalizer's baseline metrics.
    pub fallback_aggregation: Aggregation,
    /// Pass threshold for the normalizer's baseline metrics.
    pub fallback_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let primary = ScorerConfig::default();
        let fallback = ScorerConfig::fallback();
        Self {
            aggregation: primary.aggregation,
            pass_threshold: primary.pass_threshold,
            fallback_aggregation: fallback.aggregation,
            fallback_threshold: fallback.pass_threshold,
        }
    }
}

impl ScoringConfig {
    /// The direct-scoring policy.
    pub fn primary(&self) -> ScorerConfig {
        ScorerConfig {
            aggregation: self.aggregation,
            pass_threshold: self.pass_threshold,
        }
    }

    /// The policy the result normalizer computes its baseline with.
    pub fn fallback(&self) -> ScorerConfig {
        ScorerConfig {
            aggregation: self.fallback_aggregation,
            pass_threshold: self.fallback_threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use readback::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database location.
    pub database: DatabaseConfig,
    /// STT engine settings.
    pub stt: SttConfig,
    /// Audio capture settings.
    pub audio: AudioConfig,
    /// Prompt playback settings.
    pub tts: TtsConfig,
    /// Scoring policies.
    pub scoring: ScoringConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to the platform-appropriate `settings.toml`, creating parent
    /// directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The database file to use: configured path, or the platform default.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| AppPaths::new().database_file)
    }

    /// Full path of the configured GGML model file.
    pub fn model_path(&self) -> PathBuf {
        AppPaths::new()
            .models_dir
            .join(format!("{}.bin", self.stt.model))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
