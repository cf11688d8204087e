//! Inputs to and outputs from the session reducer

use crate::audio::wav::{ResourceId, WavResource};
use crate::audio::{AudioBuffer, PlaybackId};
use crate::config::{Emotion, Gender};
use crate::history::{History, HistoryStamp};

use super::state::RequestId;

/// Everything needed to issue one synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub emotion: Emotion,
    /// Language code of `text`
    pub target_language: String,
    pub voice: String,
    pub news_mode: bool,
}

/// Error classes reported by the platform recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// Microphone permission was refused
    NotAllowed,
    NoSpeech,
    Aborted,
    Network,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // --- User actions ---
    SetInput(String),
    SetSourceLanguage(String),
    SetTargetLanguage(String),
    SwapLanguages,
    SelectEmotion(Emotion),
    SelectVoice(String),
    SelectGender(Gender),
    ToggleNewsMode,
    RequestTranslation {
        text: String,
        source: String,
        target: String,
    },
    RequestSpeech(SpeechRequest),
    StopPlayback,
    ToggleListening,

    // --- Network completions ---
    TranslationSucceeded {
        request: RequestId,
        text: String,
        stamp: HistoryStamp,
    },
    TranslationFailed {
        request: RequestId,
        reason: String,
    },
    SpeechSynthesized {
        request: RequestId,
        payload: String,
    },
    SpeechFailed {
        request: RequestId,
        reason: String,
    },

    // --- Audio platform ---
    PlaybackEnded {
        playback: PlaybackId,
    },
    PlaybackFailed {
        playback: PlaybackId,
        reason: String,
    },

    // --- Speech recognition ---
    RecognitionUnavailable,
    RecognitionResult {
        transcripts: Vec<String>,
    },
    RecognitionError {
        kind: RecognitionErrorKind,
    },
    RecognitionEnded,

    // --- Connectivity ---
    ConnectivityChanged {
        online: bool,
    },

    Shutdown,
}

/// Side effects requested by the reducer, executed by the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Translate {
        request: RequestId,
        text: String,
        /// Display names, not codes
        source_name: String,
        target_name: String,
    },
    Synthesize {
        request: RequestId,
        prompt: String,
        voice: String,
    },
    /// Expose a WAV for download, replacing whatever was exposed before
    PublishDownload(WavResource),
    RevokeDownload(ResourceId),
    StartPlayback {
        playback: PlaybackId,
        buffer: AudioBuffer,
    },
    StopPlayback(PlaybackId),
    PersistHistory(History),
    StartRecognition {
        lang: String,
    },
    StopRecognition,
}
