use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime options for the view manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorSettings {
    /// Show a visual transition indicator while navigating
    #[serde(default = "default_true")]
    pub enable_transitions: bool,
    #[serde(default = "default_transition_duration_ms")]
    pub transition_duration_ms: u64,
    #[serde(default = "default_true")]
    pub enable_history: bool,
    #[serde(default = "default_max_history_length")]
    pub max_history_length: usize,
    #[serde(default = "default_true")]
    pub enable_view_caching: bool,
    #[serde(default = "default_cache_limit")]
    pub cache_limit: usize,
    /// View shown when `initialize` is not given a starting view
    #[serde(default = "default_view")]
    pub default_view: String,
}

fn default_true() -> bool {
    true
}

fn default_transition_duration_ms() -> u64 {
    300
}

fn default_max_history_length() -> usize {
    50
}

fn default_cache_limit() -> usize {
    10
}

fn default_view() -> String {
    "home".to_string()
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            enable_transitions: true,
            transition_duration_ms: default_transition_duration_ms(),
            enable_history: true,
            max_history_length: default_max_history_length(),
            enable_view_caching: true,
            cache_limit: default_cache_limit(),
            default_view: default_view(),
        }
    }
}

impl NavigatorSettings {
    pub fn builder() -> NavigatorSettingsBuilder {
        NavigatorSettingsBuilder::new()
    }

    /// Settings for tests and scripted runs: no transition indicator
    pub fn instant() -> Self {
        Self {
            enable_transitions: false,
            transition_duration_ms: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_limit == 0 {
            anyhow::bail!("cache_limit must be at least 1");
        }
        if self.max_history_length == 0 {
            anyhow::bail!("max_history_length must be at least 1");
        }
        if self.default_view.trim().is_empty() {
            anyhow::bail!("default_view must not be empty");
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse navigator settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Path of the settings file under the user config directory
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("view-navigator")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".view-navigator")
        };
        Ok(config_dir.join("settings.toml"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading navigator settings from: {:?}", path);

        if !path.exists() {
            info!("Settings file {:?} doesn't exist, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid settings file: {:?}", path))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize navigator settings to TOML")
    }
}

/// Builder for [`NavigatorSettings`]
#[derive(Debug, Clone, Default)]
pub struct NavigatorSettingsBuilder {
    settings: NavigatorSettings,
}

impl NavigatorSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_transitions(mut self, enabled: bool) -> Self {
        self.settings.enable_transitions = enabled;
        self
    }

    pub fn transition_duration_ms(mut self, ms: u64) -> Self {
        self.settings.transition_duration_ms = ms;
        self
    }

    pub fn enable_history(mut self, enabled: bool) -> Self {
        self.settings.enable_history = enabled;
        self
    }

    pub fn max_history_length(mut self, len: usize) -> Self {
        self.settings.max_history_length = len;
        self
    }

    pub fn enable_view_caching(mut self, enabled: bool) -> Self {
        self.settings.enable_view_caching = enabled;
        self
    }

    pub fn cache_limit(mut self, limit: usize) -> Self {
        self.settings.cache_limit = limit;
        self
    }

    pub fn default_view(mut self, view: &str) -> Self {
        self.settings.default_view = view.to_string();
        self
    }

    pub fn build(self) -> Result<NavigatorSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
