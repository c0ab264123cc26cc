use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Persisted application configuration: a flat JSON document in the
/// user's home directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: String,
    pub save_location: String,
    pub language: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            save_location: default_save_location(),
            language: "auto".to_string(),
            model: "whisper-1".to_string(),
        }
    }
}

fn default_save_location() -> String {
    dirs::home_dir()
        .map(|home| {
            home.join("Downloads")
                .join("storyshort")
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|| "storyshort".to_string())
}

pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    let dir = home.join(".shortstory");
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir.join("config.json"))
}

impl Config {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let mut cfg: Config = settings
            .try_deserialize()
            .context("failed to parse config file")?;
        cfg.backfill_defaults();
        Ok(cfg)
    }

    // Older config files may carry empty strings rather than omit keys.
    fn backfill_defaults(&mut self) {
        let defaults = Config::default();
        if self.save_location.is_empty() {
            self.save_location = defaults.save_location;
        }
        if self.language.is_empty() {
            self.language = defaults.language;
        }
        if self.model.is_empty() {
            self.model = defaults.model;
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
    }

    /// A plausible API credential is present.
    pub fn has_valid_token(&self) -> bool {
        self.openai_api_key.len() > 10
    }
}
