//! Transition table of the translation session
//!
//! Every transition is a function of (state, event) that mutates only the
//! state record and describes side effects as [`Effect`] values. Nothing here
//! touches the network, the audio device or the filesystem.

use crate::audio::wav::{ResourceId, WavResource};
use crate::audio::{decode_speech, PlaybackId};
use crate::config::{find_language, find_voice, language_display_name, offline, voices_for};
use crate::error::SessionError;
use crate::history::HistoryItem;

use super::event::{Effect, Event, RecognitionErrorKind, SpeechRequest};
use super::prompt::speech_prompt;
use super::state::{RequestId, SessionState, SpeechPhase, TranslationPhase};

pub fn reduce(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let mut effects = Vec::new();

    match event {
        Event::SetInput(text) => state.original_text = text,
        Event::SetSourceLanguage(code) => {
            if let Some(lang) = find_language(&code) {
                state.source_lang = lang.code.to_string();
            }
        }
        Event::SetTargetLanguage(code) => {
            if let Some(lang) = find_language(&code) {
                state.target_lang = lang.code.to_string();
            }
        }
        Event::SwapLanguages => {
            std::mem::swap(&mut state.source_lang, &mut state.target_lang);
            std::mem::swap(&mut state.original_text, &mut state.translated_text);
        }
        Event::SelectEmotion(emotion) => state.selected_emotion = emotion,
        Event::SelectVoice(name) => {
            if let Some(voice) = find_voice(&name).filter(|v| v.gender == state.selected_gender) {
                state.selected_voice = voice.name.to_string();
            }
        }
        Event::SelectGender(gender) => {
            if gender.is_enabled() {
                state.selected_gender = gender;
                let keeps_voice = voices_for(gender).any(|v| v.name == state.selected_voice);
                if !keeps_voice {
                    if let Some(voice) = voices_for(gender).next() {
                        state.selected_voice = voice.name.to_string();
                    }
                }
            }
        }
        Event::ToggleNewsMode => state.news_mode = !state.news_mode,

        Event::RequestTranslation {
            text,
            source,
            target,
        } => request_translation(state, text, source, target, &mut effects),
        Event::TranslationSucceeded {
            request,
            text,
            stamp,
        } => {
            if current_translation(state) == Some(request) {
                if let TranslationPhase::Translating {
                    original, from, to, ..
                } = std::mem::take(&mut state.translation)
                {
                    state.translated_text = text.clone();
                    state.history.push(HistoryItem {
                        id: stamp.id,
                        original,
                        translated: text,
                        from,
                        to,
                        timestamp: stamp.timestamp,
                    });
                    effects.push(Effect::PersistHistory(state.history.clone()));
                }
            }
        }
        Event::TranslationFailed { request, reason } => {
            if current_translation(state) == Some(request) {
                tracing::warn!(request = request.0, %reason, "translation failed");
                state.translation = TranslationPhase::Idle;
                state.error = Some(SessionError::NetworkFailure);
            }
        }

        Event::RequestSpeech(request) => request_speech(state, request, &mut effects),
        Event::SpeechSynthesized { request, payload } => {
            if state.speech == SpeechPhase::Synthesizing(request) {
                speech_ready(state, &payload, &mut effects);
            }
        }
        Event::SpeechFailed { request, reason } => {
            if state.speech == SpeechPhase::Synthesizing(request) {
                tracing::warn!(request = request.0, %reason, "speech synthesis failed");
                state.speech = SpeechPhase::Idle;
                state.error = Some(SessionError::SynthesisFailed);
            }
        }
        Event::StopPlayback => stop_playback(state, &mut effects),
        Event::PlaybackEnded { playback } => {
            if state.speech == SpeechPhase::Speaking(playback) {
                state.speech = SpeechPhase::Idle;
            }
        }
        Event::PlaybackFailed { playback, reason } => {
            if state.speech == SpeechPhase::Speaking(playback) {
                tracing::warn!(playback = playback.0, %reason, "playback failed");
                state.speech = SpeechPhase::Idle;
                state.error = Some(SessionError::SynthesisFailed);
                revoke_download(state, &mut effects);
            }
        }

        Event::ToggleListening => {
            if state.is_listening {
                state.is_listening = false;
                effects.push(Effect::StopRecognition);
            } else {
                state.error = None;
                state.is_listening = true;
                effects.push(Effect::StartRecognition {
                    lang: state.source_lang.clone(),
                });
            }
        }
        Event::RecognitionUnavailable => {
            state.is_listening = false;
            state.error = Some(SessionError::RecognitionUnsupported);
        }
        Event::RecognitionResult { transcripts } => {
            state.original_text = transcripts.concat();
        }
        Event::RecognitionError { kind } => {
            state.is_listening = false;
            if kind == RecognitionErrorKind::NotAllowed {
                state.error = Some(SessionError::MicrophonePermissionDenied);
            }
        }
        Event::RecognitionEnded => state.is_listening = false,

        Event::ConnectivityChanged { online } => state.is_online = online,

        Event::Shutdown => {
            stop_playback(state, &mut effects);
            revoke_download(state, &mut effects);
            if state.is_listening {
                state.is_listening = false;
                effects.push(Effect::StopRecognition);
            }
        }
    }

    effects
}

fn current_translation(state: &SessionState) -> Option<RequestId> {
    match state.translation {
        TranslationPhase::Translating { request, .. } => Some(request),
        TranslationPhase::Idle => None,
    }
}

fn request_translation(
    state: &mut SessionState,
    text: String,
    source: String,
    target: String,
    effects: &mut Vec<Effect>,
) {
    if text.trim().is_empty() || state.is_translating() {
        return;
    }
    state.error = None;

    if !state.is_online {
        match offline::lookup(&text, &target) {
            Some(translation) => state.translated_text = translation.to_string(),
            None => state.error = Some(SessionError::OfflineUnsupportedPhrase),
        }
        return;
    }

    state.translated_text.clear();
    revoke_download(state, effects);

    let request = RequestId(state.allocate_id());
    effects.push(Effect::Translate {
        request,
        text: text.clone(),
        source_name: language_display_name(&source),
        target_name: language_display_name(&target),
    });
    state.translation = TranslationPhase::Translating {
        request,
        original: text,
        from: source,
        to: target,
    };
}

fn request_speech(state: &mut SessionState, request: SpeechRequest, effects: &mut Vec<Effect>) {
    if request.text.trim().is_empty() || !state.is_online {
        return;
    }

    match state.speech {
        // A second press while speaking means stop
        SpeechPhase::Speaking(_) => stop_playback(state, effects),
        SpeechPhase::Synthesizing(_) => {}
        SpeechPhase::Idle => {
            state.error = None;
            let id = RequestId(state.allocate_id());
            effects.push(Effect::Synthesize {
                request: id,
                prompt: speech_prompt(&request),
                voice: request.voice,
            });
            state.speech = SpeechPhase::Synthesizing(id);
        }
    }
}

fn speech_ready(state: &mut SessionState, payload: &str, effects: &mut Vec<Effect>) {
    let decoded = match decode_speech(payload) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!("discarding synthesized speech: {}", e);
            state.speech = SpeechPhase::Idle;
            state.error = Some(SessionError::SynthesisFailed);
            return;
        }
    };

    revoke_download(state, effects);
    let resource = ResourceId(state.allocate_id());
    effects.push(Effect::PublishDownload(WavResource::new(resource, decoded.wav)));
    state.audio_resource = Some(resource);

    let playback = PlaybackId(state.allocate_id());
    effects.push(Effect::StartPlayback {
        playback,
        buffer: decoded.buffer,
    });
    state.speech = SpeechPhase::Speaking(playback);
}

fn stop_playback(state: &mut SessionState, effects: &mut Vec<Effect>) {
    if let SpeechPhase::Speaking(playback) = state.speech {
        effects.push(Effect::StopPlayback(playback));
        state.speech = SpeechPhase::Idle;
    }
}

fn revoke_download(state: &mut SessionState, effects: &mut Vec<Effect>) {
    if let Some(resource) = state.audio_resource.take() {
        effects.push(Effect::RevokeDownload(resource));
    }
}
