use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::countdown::secs_to_tenths;

/// Countdown length of each attempt, in seconds.
pub const INITIAL_TIME: f64 = 10.0;
/// Attempts per session.
pub const MAX_ATTEMPTS: u32 = 10;
/// Upper bound accepted for `max_attempts`; keeps a session's score well inside `u32`.
pub const MAX_ATTEMPTS_LIMIT: u32 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("initial time must be a finite number of at least 0.1 seconds, got {0}")]
    InvalidInitialTime(f64),

    #[error("max attempts must be between 1 and {}", MAX_ATTEMPTS_LIMIT)]
    InvalidMaxAttempts,

    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The two game parameters.
///
/// `initial_time_secs` sets the countdown of each attempt and the
/// denominator of the elapsed percentage used for scoring.
/// `max_attempts` sets how many activations make up a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub initial_time_secs: f64,
    pub max_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_time_secs: INITIAL_TIME,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_time_secs.is_finite() || secs_to_tenths(self.initial_time_secs) == 0 {
            return Err(ConfigError::InvalidInitialTime(self.initial_time_secs));
        }
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(ConfigError::InvalidMaxAttempts);
        }
        Ok(())
    }

    pub fn initial_tenths(&self) -> u32 {
        secs_to_tenths(self.initial_time_secs)
    }

    /// Overlay command line values on top of a stored config.
    pub fn with_overrides(
        mut self,
        initial_time_secs: Option<f64>,
        max_attempts: Option<u32>,
    ) -> Self {
        if let Some(secs) = initial_time_secs {
            self.initial_time_secs = secs;
        }
        if let Some(attempts) = max_attempts {
            self.max_attempts = attempts;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: crate::app_dirs::AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<GameConfig, ConfigError> {
        let bytes = fs::read(&self.path)?;
        let cfg = serde_json::from_slice::<GameConfig>(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing, unreadable or invalid files fall back to the defaults.
    fn load(&self) -> GameConfig {
        match self.read() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                GameConfig::default()
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring config file");
                GameConfig::default()
            }
        }
    }

    fn save(&self, cfg: &GameConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
