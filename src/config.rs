// src/config.rs - Runtime settings, read once at startup
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::activity::ActivityThresholds;
use crate::error::{GestureError, Result};
use crate::plugins::{CommandModule, Registry};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "GESTURE_CONTROL_CONFIG";

/// Shell commands for one mode, keyed by slot name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub name: String,
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub activation_ratio: f64,
    pub deactivation_ratio: f64,
    /// Estimator to spawn; its stdout is the landmark stream.
    pub landmark_command: Option<String>,
    /// Recorded landmark stream to replay.
    pub landmark_file: Option<PathBuf>,
    pub record_events: bool,
    pub output_directory: PathBuf,
    pub modes: Vec<ModeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let thresholds = ActivityThresholds::default();
        Self {
            activation_ratio: thresholds.activation_ratio,
            deactivation_ratio: thresholds.deactivation_ratio,
            landmark_command: None,
            landmark_file: None,
            record_events: false,
            output_directory: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("GestureControl")))
                .unwrap_or_else(|| PathBuf::from("./output")),
            modes: Vec::new(),
        }
    }
}

impl Config {
    /// `$GESTURE_CONTROL_CONFIG`, else `config.json` in the platform config dir.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("", "", "GestureControl")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text).map_err(|e| GestureError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |reason: String| GestureError::Config {
            path: path.to_path_buf(),
            reason,
        };

        if !(self.activation_ratio > 0.0 && self.deactivation_ratio > 0.0) {
            return Err(invalid("ratios must be positive".to_string()));
        }
        if self.deactivation_ratio > self.activation_ratio {
            return Err(invalid(format!(
                "deactivation_ratio {} exceeds activation_ratio {}",
                self.deactivation_ratio, self.activation_ratio
            )));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> ActivityThresholds {
        ActivityThresholds {
            activation_ratio: self.activation_ratio,
            deactivation_ratio: self.deactivation_ratio,
        }
    }

    /// Builds one command module per configured mode; the rest use the template.
    pub fn registry(&self) -> Result<Registry> {
        let modules = self
            .modes
            .iter()
            .map(|mode| CommandModule::from_commands(mode.name.clone(), &mode.bindings))
            .collect::<Result<Vec<_>>>()?;
        Registry::from_modules(modules)
    }
}
