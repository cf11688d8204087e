//! Core configuration types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{find_language, find_voice, Emotion};

// --- CONSTANTS ---
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TRANSLATION_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api_base_url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("unsupported language code \"{0}\"")]
    UnknownLanguage(String),

    #[error("unknown voice \"{0}\"")]
    UnknownVoice(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_translation_model")]
    pub translation_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    // Session defaults
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    #[serde(default = "default_tts_voice")]
    pub voice: String,
    #[serde(default)]
    pub emotion: Emotion,
    #[serde(default)]
    pub news_mode: bool,
    /// Start in offline mode (phrasebook only)
    #[serde(default)]
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            api_base_url: default_api_base_url(),
            translation_model: default_translation_model(),
            tts_model: default_tts_model(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            voice: default_tts_voice(),
            emotion: Emotion::default(),
            news_mode: false,
            offline: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api_base_url)?;
        for code in [&self.source_lang, &self.target_lang] {
            if find_language(code).is_none() {
                return Err(ConfigError::UnknownLanguage(code.clone()));
            }
        }
        if find_voice(&self.voice).is_none() {
            return Err(ConfigError::UnknownVoice(self.voice.clone()));
        }
        Ok(())
    }
}

// --- Default Function Helpers ---
pub fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
pub fn default_translation_model() -> String {
    DEFAULT_TRANSLATION_MODEL.to_string()
}
pub fn default_tts_model() -> String {
    DEFAULT_TTS_MODEL.to_string()
}
pub fn default_target_lang() -> String {
    "bn".to_string()
}
pub fn default_tts_voice() -> String {
    "Puck".to_string()
}

/// System UI language when the catalog offers it, English otherwise
pub fn default_source_lang() -> String {
    let sys_locale = sys_locale::get_locale().unwrap_or_default();
    let lang_code = sys_locale.split(['-', '_']).next().unwrap_or("en").to_lowercase();

    match find_language(&lang_code) {
        Some(lang) if lang.code != default_target_lang() => lang.code.to_string(),
        _ => "en".to_string(),
    }
}
