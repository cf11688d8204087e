//! Configuration, static catalog and offline phrasebook

pub mod catalog;
pub mod offline;
mod types;

pub use catalog::{
    find_language, find_voice, language_display_name, speech_language_name, voices_for, Emotion,
    Gender, Language, Voice, LANGUAGES, VOICES,
};
pub use types::*;

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "roman-translator";
const CONFIG_FILE: &str = "config.json";

/// Per-user directory for config and history
pub fn app_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_default().join(APP_DIR)
}

pub fn config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE)
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is missing.
    /// The API key can always be supplied through the environment.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<Config>(&data)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Config::default()
        };

        if let Some(key) = env_api_key() {
            config.gemini_api_key = key;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("writing {}", path.display()))
    }
}

fn env_api_key() -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
