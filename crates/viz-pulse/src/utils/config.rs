//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.viz-pulse.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::audio::{SessionSettings, SpectrumSettings};

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_DECODE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TICK_RATE_HZ: u32 = 60;
const DEFAULT_REPORT_INTERVAL_TICKS: u64 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";

const CONFIG_TEMPLATE: &str = r#"# viz-pulse configuration file

# Timeout in seconds when opening an audio device (default: 3)
# device_timeout_secs = 3

# Timeout in seconds for a file to finish decoding (default: 10)
# decode_timeout_secs = 10

# Last played file (auto-saved)
# last_file = "/path/to/track.wav"

# =============================================================================
# Analysis loop
# =============================================================================

# tick_rate_hz = 60               # Analysis ticks per second
# report_interval_ticks = 60      # Ticks between logged signal summaries

# =============================================================================
# Spectrum
# =============================================================================

# smoothing = 0.3                 # Time smoothing between frames, 0..1
# min_decibels = -90.0            # Maps to byte 0
# max_decibels = -10.0            # Maps to byte 255

# =============================================================================
# Logging
# =============================================================================

# log_level = "info"              # RUST_LOG overrides this
"#;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub device_timeout_secs: Option<u64>,
    pub decode_timeout_secs: Option<u64>,
    pub last_file: Option<PathBuf>,

    pub tick_rate_hz: Option<u32>,
    pub report_interval_ticks: Option<u64>,

    pub smoothing: Option<f32>,
    pub min_decibels: Option<f32>,
    pub max_decibels: Option<f32>,

    pub log_level: Option<String>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".viz-pulse.toml"))
    }

    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Read `path`, writing the commented template there first if it is missing
    pub fn load_from(path: &Path) -> Self {
        // Create template file if it doesn't exist
        if !path.exists() {
            match fs::write(path, CONFIG_TEMPLATE) {
                Ok(()) => info!("created config template at {}", path.display()),
                Err(e) => warn!("could not create {}: {}", path.display(), e),
            }
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        toml::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring malformed {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        match toml::to_string(self) {
            Ok(content) => match fs::write(path, &content) {
                Ok(()) => info!("config saved to {}", path.display()),
                Err(e) => warn!("could not save {}: {}", path.display(), e),
            },
            Err(e) => warn!("could not serialize config: {}", e),
        }
    }

    pub fn set_last_file(&mut self, path: &Path) {
        if self.last_file.as_deref() == Some(path) {
            return;
        }
        self.last_file = Some(path.to_path_buf());
        self.save();
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(
            self.device_timeout_secs
                .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS),
        )
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs(
            self.decode_timeout_secs
                .unwrap_or(DEFAULT_DECODE_TIMEOUT_SECS),
        )
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz.unwrap_or(DEFAULT_TICK_RATE_HZ).max(1)
    }

    pub fn report_interval_ticks(&self) -> u64 {
        self.report_interval_ticks
            .unwrap_or(DEFAULT_REPORT_INTERVAL_TICKS)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Spectrum settings with defaults, sanitized
    pub fn spectrum(&self) -> SpectrumSettings {
        let defaults = SpectrumSettings::default();
        SpectrumSettings {
            smoothing: self.smoothing.unwrap_or(defaults.smoothing),
            min_decibels: self.min_decibels.unwrap_or(defaults.min_decibels),
            max_decibels: self.max_decibels.unwrap_or(defaults.max_decibels),
        }
        .sanitized()
    }

    pub fn session(&self) -> SessionSettings {
        SessionSettings {
            decode_timeout: self.decode_timeout(),
            spectrum: self.spectrum(),
        }
    }
}
