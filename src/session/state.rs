//! Session state record

use crate::audio::wav::ResourceId;
use crate::audio::PlaybackId;
use crate::config::{Config, Emotion, Gender};
use crate::error::SessionError;
use crate::history::History;

/// Identifier of one translation or synthesis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TranslationPhase {
    #[default]
    Idle,
    /// Carries what the history entry will record once the call returns
    Translating {
        request: RequestId,
        original: String,
        from: String,
        to: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechPhase {
    #[default]
    Idle,
    Synthesizing(RequestId),
    Speaking(PlaybackId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,

    // Voice options
    pub selected_emotion: Emotion,
    pub selected_voice: String,
    pub selected_gender: Gender,
    pub news_mode: bool,

    // Platform flags
    pub is_online: bool,
    pub is_listening: bool,

    pub translation: TranslationPhase,
    pub speech: SpeechPhase,

    /// Downloadable WAV of the last synthesized utterance
    pub audio_resource: Option<ResourceId>,

    /// Current error banner, cleared on the next attempted action
    pub error: Option<SessionError>,

    pub history: History,

    next_id: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::from_config(&Config::default(), History::default())
    }
}

impl SessionState {
    pub fn from_config(config: &Config, history: History) -> Self {
        Self {
            original_text: String::new(),
            translated_text: String::new(),
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            selected_emotion: config.emotion,
            selected_voice: config.voice.clone(),
            selected_gender: Gender::Male,
            news_mode: config.news_mode,
            is_online: !config.offline,
            is_listening: false,
            translation: TranslationPhase::Idle,
            speech: SpeechPhase::Idle,
            audio_resource: None,
            error: None,
            history,
            next_id: 1,
        }
    }

    pub fn is_translating(&self) -> bool {
        matches!(self.translation, TranslationPhase::Translating { .. })
    }

    pub fn is_generating_speech(&self) -> bool {
        matches!(self.speech, SpeechPhase::Synthesizing(_))
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.speech, SpeechPhase::Speaking(_))
    }

    /// Allocate the next id; request, playback and resource ids share one
    /// counter so they never collide
    pub(crate) fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
