//! Translation session
//!
//! [`Session`] owns the state record and applies events to it through the
//! reducer. The returned effects are executed by [`runtime::Runtime`], which
//! feeds completion events back in.

mod event;
mod prompt;
mod reducer;
pub mod runtime;
mod state;

pub use event::{Effect, Event, RecognitionErrorKind, SpeechRequest};
pub use prompt::speech_prompt;
pub use reducer::reduce;
pub use runtime::Runtime;
pub use state::{RequestId, SessionState, SpeechPhase, TranslationPhase};

use crate::config::{voices_for, Voice};

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new(state: SessionState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        reduce(&mut self.state, event)
    }

    /// Translation request for the current input and language pair
    pub fn request_translation(&self) -> Event {
        Event::RequestTranslation {
            text: self.state.original_text.clone(),
            source: self.state.source_lang.clone(),
            target: self.state.target_lang.clone(),
        }
    }

    /// Speech request for the current translation and voice options
    pub fn request_speech(&self) -> Event {
        Event::RequestSpeech(SpeechRequest {
            text: self.state.translated_text.clone(),
            emotion: self.state.selected_emotion,
            target_language: self.state.target_lang.clone(),
            voice: self.state.selected_voice.clone(),
            news_mode: self.state.news_mode,
        })
    }

    pub fn available_voices(&self) -> Vec<&'static Voice> {
        voices_for(self.state.selected_gender).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::ResourceId;
    use crate::audio::PlaybackId;
    use crate::config::{Config, Emotion, Gender};
    use crate::error::SessionError;
    use crate::history::{History, HistoryStamp, MAX_HISTORY_SIZE};

    // "AAD/fw==" is two samples: 0 and i16::MAX
    const SPEECH: &str = "AAD/fw==";

    fn session() -> Session {
        // Pin the source language, the default follows the system locale
        let config = Config {
            source_lang: "en".to_string(),
            ..Config::default()
        };
        Session::new(SessionState::from_config(&config, History::new()))
    }

    fn stamp(n: i64) -> HistoryStamp {
        HistoryStamp {
            id: format!("item-{}", n),
            timestamp: 1_700_000_000_000 + n,
        }
    }

    fn translate(session: &mut Session, text: &str) -> Vec<Effect> {
        session.update(Event::SetInput(text.to_string()));
        let request = session.request_translation();
        session.update(request)
    }

    fn translating_id(session: &Session) -> RequestId {
        match &session.state().translation {
            TranslationPhase::Translating { request, .. } => *request,
            TranslationPhase::Idle => panic!("not translating"),
        }
    }

    fn synthesizing_id(session: &Session) -> RequestId {
        match session.state().speech {
            SpeechPhase::Synthesizing(id) => id,
            other => panic!("not synthesizing: {:?}", other),
        }
    }

    fn speaking_id(session: &Session) -> PlaybackId {
        match session.state().speech {
            SpeechPhase::Speaking(id) => id,
            other => panic!("not speaking: {:?}", other),
        }
    }

    /// Drive a session to the speaking phase with `translated` as output
    fn speak(session: &mut Session, translated: &str) -> Vec<Effect> {
        translate(session, "hello");
        let request = translating_id(session);
        session.update(Event::TranslationSucceeded {
            request,
            text: translated.to_string(),
            stamp: stamp(0),
        });
        let speech = session.request_speech();
        session.update(speech);
        let request = synthesizing_id(session);
        session.update(Event::SpeechSynthesized {
            request,
            payload: SPEECH.to_string(),
        })
    }

    fn published(effects: &[Effect]) -> Option<ResourceId> {
        effects.iter().find_map(|e| match e {
            Effect::PublishDownload(resource) => Some(resource.id),
            _ => None,
        })
    }

    #[test]
    fn empty_input_is_a_noop() {
        let mut session = session();
        let before = session.state().clone();
        assert!(translate(&mut session, "   \n").is_empty());
        let mut expected = before;
        expected.original_text = "   \n".to_string();
        assert_eq!(session.state(), &expected);
    }

    #[test]
    fn empty_input_keeps_error_banner() {
        let mut session = session();
        session.update(Event::ConnectivityChanged { online: false });
        translate(&mut session, "unlisted phrase");
        translate(&mut session, "");
        assert_eq!(
            session.state().error,
            Some(SessionError::OfflineUnsupportedPhrase)
        );
    }

    #[test]
    fn online_translation_emits_call_with_display_names() {
        let mut session = session();
        let effects = translate(&mut session, "Good morning");
        assert!(session.state().is_translating());
        assert_eq!(
            effects,
            vec![Effect::Translate {
                request: translating_id(&session),
                text: "Good morning".to_string(),
                source_name: "English".to_string(),
                target_name: "Bengali (বাংলা)".to_string(),
            }]
        );
    }

    #[test]
    fn translation_is_single_flight() {
        let mut session = session();
        translate(&mut session, "one");
        let first = translating_id(&session);
        assert!(translate(&mut session, "two").is_empty());
        assert_eq!(translating_id(&session), first);
    }

    #[test]
    fn successful_translation_records_history() {
        let mut session = session();
        translate(&mut session, "Good morning");
        let request = translating_id(&session);
        let effects = session.update(Event::TranslationSucceeded {
            request,
            text: "সুপ্রভাত".to_string(),
            stamp: stamp(1),
        });

        let state = session.state();
        assert!(!state.is_translating());
        assert_eq!(state.translated_text, "সুপ্রভাত");
        let item = state.history.latest().unwrap();
        assert_eq!(item.original, "Good morning");
        assert_eq!((item.from.as_str(), item.to.as_str()), ("en", "bn"));
        assert_eq!(item.id, "item-1");
        assert_eq!(effects, vec![Effect::PersistHistory(state.history.clone())]);
    }

    #[test]
    fn history_keeps_newest_twenty() {
        let mut session = session();
        for n in 0..=MAX_HISTORY_SIZE as i64 {
            translate(&mut session, &format!("phrase {}", n));
            let request = translating_id(&session);
            session.update(Event::TranslationSucceeded {
                request,
                text: format!("translated {}", n),
                stamp: stamp(n),
            });
        }
        let history = &session.state().history;
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(history.latest().unwrap().original, "phrase 20");
        assert!(history.items().iter().all(|i| i.original != "phrase 0"));
    }

    #[test]
    fn failed_translation_raises_network_banner() {
        let mut session = session();
        translate(&mut session, "hello");
        let request = translating_id(&session);
        let effects = session.update(Event::TranslationFailed {
            request,
            reason: "connection refused".to_string(),
        });
        assert!(effects.is_empty());
        assert!(!session.state().is_translating());
        assert_eq!(session.state().error, Some(SessionError::NetworkFailure));
        assert_eq!(
            session.state().error.unwrap().to_string(),
            "Translation failed. Check connection."
        );
    }

    #[test]
    fn stale_translation_results_are_ignored() {
        let mut session = session();
        translate(&mut session, "hello");
        let request = translating_id(&session);
        let stale = RequestId(request.0 + 100);

        session.update(Event::TranslationSucceeded {
            request: stale,
            text: "late".to_string(),
            stamp: stamp(0),
        });
        session.update(Event::TranslationFailed {
            request: stale,
            reason: "late".to_string(),
        });
        assert_eq!(translating_id(&session), request);
        assert!(session.state().history.is_empty());
        assert_eq!(session.state().error, None);
    }

    #[test]
    fn offline_phrasebook_hit_translates_synchronously() {
        let mut session = session();
        session.update(Event::ConnectivityChanged { online: false });
        let effects = translate(&mut session, "  Hello ");
        assert!(effects.is_empty());
        assert!(!session.state().is_translating());
        assert_eq!(session.state().translated_text, "নমস্কার / হ্যালো");
        assert!(session.state().history.is_empty());
        assert_eq!(session.state().error, None);
    }

    #[test]
    fn offline_phrasebook_miss_raises_banner() {
        let mut session = session();
        session.update(Event::ConnectivityChanged { online: false });
        assert!(translate(&mut session, "Where is the station?").is_empty());
        assert_eq!(
            session.state().error,
            Some(SessionError::OfflineUnsupportedPhrase)
        );
    }

    #[test]
    fn new_attempt_clears_banner() {
        let mut session = session();
        session.update(Event::ConnectivityChanged { online: false });
        translate(&mut session, "unlisted");
        assert!(session.state().error.is_some());
        translate(&mut session, "hello");
        assert_eq!(session.state().error, None);
    }

    #[test]
    fn speech_request_builds_prompt_from_options() {
        let mut session = session();
        session.update(Event::SelectEmotion(Emotion::Sad));
        session.update(Event::SelectVoice("Charon".to_string()));
        translate(&mut session, "hello");
        let request = translating_id(&session);
        session.update(Event::TranslationSucceeded {
            request,
            text: "হ্যালো".to_string(),
            stamp: stamp(0),
        });

        let speech = session.request_speech();
        let effects = session.update(speech);
        assert!(session.state().is_generating_speech());
        assert_eq!(
            effects,
            vec![Effect::Synthesize {
                request: synthesizing_id(&session),
                prompt: "Speak the following Bengali text with a sad & emotional tone: \"হ্যালো\""
                    .to_string(),
                voice: "Charon".to_string(),
            }]
        );
    }

    #[test]
    fn speech_requires_text_and_connectivity() {
        let mut session = session();
        let speech = session.request_speech();
        assert!(session.update(speech).is_empty());

        let mut offline = session.state().clone();
        offline.translated_text = "হ্যালো".to_string();
        offline.is_online = false;
        let mut session = Session::new(offline);
        let speech = session.request_speech();
        assert!(session.update(speech).is_empty());
        assert_eq!(session.state().speech, SpeechPhase::Idle);
    }

    #[test]
    fn synthesized_speech_publishes_and_plays() {
        let mut session = session();
        let effects = speak(&mut session, "হ্যালো");
        let playback = speaking_id(&session);
        let resource = session.state().audio_resource.unwrap();

        assert_eq!(effects.len(), 2);
        match (&effects[0], &effects[1]) {
            (Effect::PublishDownload(wav), Effect::StartPlayback { playback: p, buffer }) => {
                assert_eq!(wav.id, resource);
                assert_eq!(wav.bytes.len(), 44 + 4);
                assert_eq!(*p, playback);
                assert_eq!(buffer.len(), 2);
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn second_speech_request_while_speaking_stops() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let playback = speaking_id(&session);

        let speech = session.request_speech();
        let effects = session.update(speech);
        assert_eq!(effects, vec![Effect::StopPlayback(playback)]);
        assert_eq!(session.state().speech, SpeechPhase::Idle);
        assert!(session.state().audio_resource.is_some());
    }

    #[test]
    fn speech_request_while_synthesizing_is_ignored() {
        let mut session = session();
        let mut state = session.state().clone();
        state.translated_text = "হ্যালো".to_string();
        session = Session::new(state);
        let speech = session.request_speech();
        session.update(speech.clone());
        let first = synthesizing_id(&session);
        assert!(session.update(speech).is_empty());
        assert_eq!(synthesizing_id(&session), first);
    }

    #[test]
    fn new_speech_result_revokes_previous_download() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let first = session.state().audio_resource.unwrap();
        let playback = speaking_id(&session);
        session.update(Event::PlaybackEnded { playback });

        let speech = session.request_speech();
        session.update(speech);
        let request = synthesizing_id(&session);
        let effects = session.update(Event::SpeechSynthesized {
            request,
            payload: SPEECH.to_string(),
        });
        assert_eq!(effects[0], Effect::RevokeDownload(first));
        let second = published(&effects).unwrap();
        assert_ne!(first, second);
        assert_eq!(session.state().audio_resource, Some(second));
    }

    #[test]
    fn new_online_translation_revokes_download() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let resource = session.state().audio_resource.unwrap();
        let effects = translate(&mut session, "thank you");
        assert_eq!(effects[0], Effect::RevokeDownload(resource));
        assert_eq!(session.state().audio_resource, None);
        assert_eq!(session.state().translated_text, "");
    }

    #[test]
    fn undecodable_payload_fails_without_publishing() {
        for payload in ["not base64!", "AAAA", ""] {
            let mut session = session();
            let mut state = session.state().clone();
            state.translated_text = "হ্যালো".to_string();
            session = Session::new(state);
            let speech = session.request_speech();
            session.update(speech);
            let request = synthesizing_id(&session);

            let effects = session.update(Event::SpeechSynthesized {
                request,
                payload: payload.to_string(),
            });
            assert!(effects.is_empty(), "payload {:?}", payload);
            assert_eq!(session.state().speech, SpeechPhase::Idle);
            assert_eq!(session.state().audio_resource, None);
            assert_eq!(session.state().error, Some(SessionError::SynthesisFailed));
        }
    }

    #[test]
    fn speech_failure_raises_banner() {
        let mut session = session();
        let mut state = session.state().clone();
        state.translated_text = "হ্যালো".to_string();
        session = Session::new(state);
        let speech = session.request_speech();
        session.update(speech);
        let request = synthesizing_id(&session);

        session.update(Event::SpeechFailed {
            request,
            reason: "No audio data returned from Gemini API".to_string(),
        });
        assert_eq!(session.state().speech, SpeechPhase::Idle);
        assert_eq!(session.state().error, Some(SessionError::SynthesisFailed));
    }

    #[test]
    fn stale_speech_events_are_ignored() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let playback = speaking_id(&session);
        let before = session.state().clone();

        assert!(session
            .update(Event::SpeechSynthesized {
                request: RequestId(999),
                payload: SPEECH.to_string(),
            })
            .is_empty());
        session.update(Event::PlaybackEnded {
            playback: PlaybackId(playback.0 + 50),
        });
        session.update(Event::PlaybackFailed {
            playback: PlaybackId(playback.0 + 50),
            reason: "device lost".to_string(),
        });
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn playback_end_returns_to_idle() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let playback = speaking_id(&session);
        assert!(session.update(Event::PlaybackEnded { playback }).is_empty());
        assert_eq!(session.state().speech, SpeechPhase::Idle);
        // The download outlives the playback
        assert!(session.state().audio_resource.is_some());
    }

    #[test]
    fn playback_failure_releases_download() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let playback = speaking_id(&session);
        let resource = session.state().audio_resource.unwrap();

        let effects = session.update(Event::PlaybackFailed {
            playback,
            reason: "no output device".to_string(),
        });
        assert_eq!(effects, vec![Effect::RevokeDownload(resource)]);
        assert_eq!(session.state().audio_resource, None);
        assert_eq!(session.state().error, Some(SessionError::SynthesisFailed));
    }

    #[test]
    fn stop_playback_when_idle_is_a_noop() {
        let mut session = session();
        assert!(session.update(Event::StopPlayback).is_empty());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let playback = speaking_id(&session);
        let resource = session.state().audio_resource.unwrap();
        let request = translating_id_after(&mut session);
        let mut ids = vec![playback.0, resource.0, request.0];
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    fn translating_id_after(session: &mut Session) -> RequestId {
        translate(session, "thank you");
        translating_id(session)
    }

    #[test]
    fn female_voices_are_disabled() {
        let mut session = session();
        session.update(Event::SelectGender(Gender::Female));
        assert_eq!(session.state().selected_gender, Gender::Male);
        assert!(session
            .available_voices()
            .iter()
            .all(|v| v.gender == Gender::Male));

        session.update(Event::SelectVoice("Kore".to_string()));
        assert_eq!(session.state().selected_voice, "Puck");
        session.update(Event::SelectVoice("Fenrir".to_string()));
        assert_eq!(session.state().selected_voice, "Fenrir");
        session.update(Event::SelectVoice("Nobody".to_string()));
        assert_eq!(session.state().selected_voice, "Fenrir");
    }

    #[test]
    fn swap_exchanges_languages_and_text() {
        let mut session = session();
        session.update(Event::SetInput("hello".to_string()));
        let mut state = session.state().clone();
        state.translated_text = "হ্যালো".to_string();
        let mut session = Session::new(state);

        session.update(Event::SwapLanguages);
        let state = session.state();
        assert_eq!((state.source_lang.as_str(), state.target_lang.as_str()), ("bn", "en"));
        assert_eq!(state.original_text, "হ্যালো");
        assert_eq!(state.translated_text, "hello");
    }

    #[test]
    fn unknown_language_codes_are_ignored() {
        let mut session = session();
        session.update(Event::SetTargetLanguage("xx".to_string()));
        assert_eq!(session.state().target_lang, "bn");
        session.update(Event::SetTargetLanguage("fr".to_string()));
        assert_eq!(session.state().target_lang, "fr");
    }

    #[test]
    fn news_mode_toggles() {
        let mut session = session();
        session.update(Event::ToggleNewsMode);
        assert!(session.state().news_mode);
        match session.request_speech() {
            Event::RequestSpeech(request) => assert!(request.news_mode),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn listening_toggles_recognition() {
        let mut session = session();
        let effects = session.update(Event::ToggleListening);
        assert_eq!(
            effects,
            vec![Effect::StartRecognition {
                lang: "en".to_string()
            }]
        );
        assert!(session.state().is_listening);

        session.update(Event::RecognitionResult {
            transcripts: vec!["good ".to_string(), "morning".to_string()],
        });
        assert_eq!(session.state().original_text, "good morning");

        assert_eq!(
            session.update(Event::ToggleListening),
            vec![Effect::StopRecognition]
        );
        session.update(Event::RecognitionEnded);
        assert!(!session.state().is_listening);
    }

    #[test]
    fn recognition_errors_map_to_banners() {
        let mut session = session();
        session.update(Event::ToggleListening);
        session.update(Event::RecognitionError {
            kind: RecognitionErrorKind::NoSpeech,
        });
        assert!(!session.state().is_listening);
        assert_eq!(session.state().error, None);

        session.update(Event::ToggleListening);
        session.update(Event::RecognitionError {
            kind: RecognitionErrorKind::NotAllowed,
        });
        assert_eq!(
            session.state().error,
            Some(SessionError::MicrophonePermissionDenied)
        );

        session.update(Event::ToggleListening);
        session.update(Event::RecognitionUnavailable);
        assert!(!session.state().is_listening);
        assert_eq!(
            session.state().error,
            Some(SessionError::RecognitionUnsupported)
        );
    }

    #[test]
    fn shutdown_releases_everything() {
        let mut session = session();
        speak(&mut session, "হ্যালো");
        let playback = speaking_id(&session);
        let resource = session.state().audio_resource.unwrap();
        session.update(Event::ToggleListening);

        let effects = session.update(Event::Shutdown);
        assert_eq!(
            effects,
            vec![
                Effect::StopPlayback(playback),
                Effect::RevokeDownload(resource),
                Effect::StopRecognition,
            ]
        );
        assert_eq!(session.state().speech, SpeechPhase::Idle);
        assert_eq!(session.state().audio_resource, None);
    }
}
