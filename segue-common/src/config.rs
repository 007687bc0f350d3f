//! Configuration for the crossfade engine
//!
//! One TOML file covers the whole engine; every field has a built-in
//! default so an empty file (or no file at all) yields a working
//! configuration. Command-line overrides are applied on top via
//! [`ConfigOverrides`].

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Engine configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Master switch; off means every transition uses the fixed ramp
    #[serde(default = "default_enable_intelligent")]
    pub enable_intelligent_crossfade: bool,

    /// Demand beat-matchability for the intelligent path
    ///
    /// When false the intelligent ramp may run without tempo adjustment
    /// even if the BPM check fails.
    #[serde(default = "default_require_beat_sync")]
    pub require_beat_sync: bool,

    /// Treat key incompatibility as blocking (advisory when false)
    #[serde(default)]
    pub require_key_match: bool,

    /// Accepted BPM deviation after half/double-time normalization, percent
    #[serde(default = "default_max_bpm_difference")]
    pub max_bpm_difference_percent: f64,

    /// Lower clamp for computed crossfade length, seconds
    #[serde(default = "default_min_crossfade")]
    pub min_crossfade_seconds: f64,

    /// Upper clamp for computed crossfade length, seconds
    #[serde(default = "default_max_crossfade")]
    pub max_crossfade_seconds: f64,

    /// Length of the fixed linear fallback ramp, seconds
    #[serde(default = "default_fallback_crossfade")]
    pub fallback_crossfade_seconds: f64,

    /// Energy profile segment length, seconds
    #[serde(default = "default_segment_seconds")]
    pub segment_seconds: f64,

    /// Executor ramp update cadence, milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Intro boundary assumed when no analysis exists (fraction of track)
    #[serde(default = "default_intro_ratio")]
    pub default_intro_ratio: f64,

    /// Outro boundary assumed when no analysis exists (fraction of track)
    #[serde(default = "default_outro_ratio")]
    pub default_outro_ratio: f64,
}

fn default_enable_intelligent() -> bool {
    true
}

fn default_require_beat_sync() -> bool {
    true
}

fn default_max_bpm_difference() -> f64 {
    8.0
}

fn default_min_crossfade() -> f64 {
    1.0
}

fn default_max_crossfade() -> f64 {
    30.0
}

fn default_fallback_crossfade() -> f64 {
    3.0
}

fn default_segment_seconds() -> f64 {
    0.5
}

fn default_tick_interval_ms() -> u64 {
    20
}

fn default_intro_ratio() -> f64 {
    0.15
}

fn default_outro_ratio() -> f64 {
    0.85
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_intelligent_crossfade: default_enable_intelligent(),
            require_beat_sync: default_require_beat_sync(),
            require_key_match: false,
            max_bpm_difference_percent: default_max_bpm_difference(),
            min_crossfade_seconds: default_min_crossfade(),
            max_crossfade_seconds: default_max_crossfade(),
            fallback_crossfade_seconds: default_fallback_crossfade(),
            segment_seconds: default_segment_seconds(),
            tick_interval_ms: default_tick_interval_ms(),
            default_intro_ratio: default_intro_ratio(),
            default_outro_ratio: default_outro_ratio(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: EngineConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        info!("Loaded engine configuration from {:?}", path);
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.min_crossfade_seconds <= 0.0 {
            return Err(Error::Config(format!(
                "min_crossfade_seconds must be positive, got {}",
                self.min_crossfade_seconds
            )));
        }
        if self.max_crossfade_seconds < self.min_crossfade_seconds {
            return Err(Error::Config(format!(
                "max_crossfade_seconds {} below min_crossfade_seconds {}",
                self.max_crossfade_seconds, self.min_crossfade_seconds
            )));
        }
        if self.fallback_crossfade_seconds <= 0.0 {
            return Err(Error::Config(format!(
                "fallback_crossfade_seconds must be positive, got {}",
                self.fallback_crossfade_seconds
            )));
        }
        if self.segment_seconds <= 0.0 {
            return Err(Error::Config(format!(
                "segment_seconds must be positive, got {}",
                self.segment_seconds
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be positive".into()));
        }
        if self.max_bpm_difference_percent < 0.0 {
            return Err(Error::Config(format!(
                "max_bpm_difference_percent must not be negative, got {}",
                self.max_bpm_difference_percent
            )));
        }
        for (name, value) in [
            ("default_intro_ratio", self.default_intro_ratio),
            ("default_outro_ratio", self.default_outro_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(v) = overrides.enable_intelligent_crossfade {
            self.enable_intelligent_crossfade = v;
        }
        if let Some(v) = overrides.max_bpm_difference_percent {
            self.max_bpm_difference_percent = v;
        }
        if let Some(v) = overrides.min_crossfade_seconds {
            self.min_crossfade_seconds = v;
        }
        if let Some(v) = overrides.max_crossfade_seconds {
            self.max_crossfade_seconds = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Ramp update cadence as a Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Fixed fallback ramp length as a Duration
    pub fn fallback_duration(&self) -> Duration {
        Duration::from_secs_f64(self.fallback_crossfade_seconds)
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub enable_intelligent_crossfade: Option<bool>,
    pub max_bpm_difference_percent: Option<f64>,
    pub min_crossfade_seconds: Option<f64>,
    pub max_crossfade_seconds: Option<f64>,
}
