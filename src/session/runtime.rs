//! Effect executor
//!
//! The runtime is the only place that talks to the outside world. It applies
//! events to the session on the calling thread, runs network calls on
//! short-lived worker threads, and owns the playback engine and the download
//! slot. Workers and the audio platform report back by sending exactly one
//! event each through the runtime's channel.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use crate::api::{SpeechBackend, TranslationBackend};
use crate::audio::{AudioBuffer, PlaybackEngine, PlaybackId, WavResource};
use crate::history::{HistoryStamp, HistoryStore};

use super::{Effect, Event, RequestId, Session, SessionState};

/// Default file name offered when saving the synthesized audio
pub const DEFAULT_DOWNLOAD_NAME: &str = "translation.wav";

pub struct Runtime {
    session: Session,
    translator: Arc<dyn TranslationBackend>,
    speaker: Arc<dyn SpeechBackend>,
    player: Box<dyn PlaybackEngine>,
    history_store: Option<HistoryStore>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    download: Option<WavResource>,
}

impl Runtime {
    pub fn new(
        session: Session,
        translator: Arc<dyn TranslationBackend>,
        speaker: Arc<dyn SpeechBackend>,
        player: Box<dyn PlaybackEngine>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            session,
            translator,
            speaker,
            player,
            history_store: None,
            tx,
            rx,
            download: None,
        }
    }

    /// Persist history changes to `store`
    pub fn with_history_store(mut self, store: HistoryStore) -> Self {
        self.history_store = Some(store);
        self
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Channel for platform events (connectivity, recognition results)
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Apply one event and execute whatever it asks for
    pub fn dispatch(&mut self, event: Event) {
        tracing::trace!(?event, "dispatch");
        for effect in self.session.update(event) {
            self.execute(effect);
        }
    }

    /// Translate the current input
    pub fn translate(&mut self) {
        let event = self.session.request_translation();
        self.dispatch(event);
    }

    /// Speak the current translation, or stop if already speaking
    pub fn speak(&mut self) {
        let event = self.session.request_speech();
        self.dispatch(event);
    }

    /// Wait up to `timeout` for one queued event and apply it. Returns false
    /// when nothing arrived.
    pub fn recv_timeout(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            // The runtime holds a sender itself, so this cannot happen
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Apply every event already queued, without blocking
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
            applied += 1;
        }
        applied
    }

    /// Process events until no network call is in flight, or `timeout`
    /// elapses. Returns true if the session settled.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state().is_translating() || self.state().is_generating_speech() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.recv_timeout(deadline - now);
        }
        true
    }

    /// The WAV of the last synthesized utterance, while it is published
    pub fn download(&self) -> Option<&WavResource> {
        self.download.as_ref()
    }

    /// Write the published WAV to `path`
    pub fn save_download(&self, path: &Path) -> Result<()> {
        let Some(resource) = &self.download else {
            bail!("no synthesized audio to save");
        };
        resource.save(path)?;
        tracing::info!(path = %path.display(), bytes = resource.bytes.len(), "saved audio");
        Ok(())
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Translate {
                request,
                text,
                source_name,
                target_name,
            } => self.spawn_translation(request, text, source_name, target_name),
            Effect::Synthesize {
                request,
                prompt,
                voice,
            } => self.spawn_synthesis(request, prompt, voice),
            Effect::PublishDownload(resource) => {
                tracing::info!(
                    resource = resource.id.0,
                    bytes = resource.bytes.len(),
                    "audio available for download"
                );
                self.download = Some(resource);
            }
            Effect::RevokeDownload(id) => {
                if self.download.as_ref().map(|d| d.id) == Some(id) {
                    tracing::debug!(resource = id.0, "revoking download");
                    self.download = None;
                }
            }
            Effect::StartPlayback { playback, buffer } => self.start_playback(playback, buffer),
            Effect::StopPlayback(playback) => {
                tracing::debug!(playback = playback.0, "stopping playback");
                self.player.stop(playback);
            }
            Effect::PersistHistory(history) => {
                if let Some(store) = &self.history_store {
                    if let Err(e) = store.save(&history) {
                        tracing::warn!("failed to save history to {}: {:#}", store.path().display(), e);
                    }
                }
            }
            Effect::StartRecognition { lang } => {
                // No speech-to-text engine on this platform
                tracing::info!(%lang, "speech recognition requested but unavailable");
                self.dispatch(Event::RecognitionUnavailable);
            }
            Effect::StopRecognition => tracing::debug!("stopping recognition"),
        }
    }

    fn spawn_translation(
        &self,
        request: RequestId,
        text: String,
        source_name: String,
        target_name: String,
    ) {
        tracing::info!(request = request.0, from = %source_name, to = %target_name, "translating");
        let translator = self.translator.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match translator.translate(&text, &source_name, &target_name) {
                Ok(text) => Event::TranslationSucceeded {
                    request,
                    text,
                    stamp: HistoryStamp::now(),
                },
                Err(e) => {
                    tracing::warn!(request = request.0, "translation error: {:#}", e);
                    Event::TranslationFailed {
                        request,
                        reason: format!("{:#}", e),
                    }
                }
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_synthesis(&self, request: RequestId, prompt: String, voice: String) {
        tracing::info!(request = request.0, %voice, "synthesizing speech");
        let speaker = self.speaker.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match speaker.synthesize(&prompt, &voice) {
                Ok(payload) => Event::SpeechSynthesized { request, payload },
                Err(e) => {
                    tracing::warn!(request = request.0, "speech error: {:#}", e);
                    Event::SpeechFailed {
                        request,
                        reason: format!("{:#}", e),
                    }
                }
            };
            let _ = tx.send(event);
        });
    }

    fn start_playback(&mut self, playback: PlaybackId, buffer: AudioBuffer) {
        tracing::info!(
            playback = playback.0,
            seconds = buffer.duration_secs(),
            "starting playback"
        );
        let tx = self.tx.clone();
        let on_end = Box::new(move || {
            let _ = tx.send(Event::PlaybackEnded { playback });
        });
        if let Err(e) = self.player.start(playback, buffer, on_end) {
            self.dispatch(Event::PlaybackFailed {
                playback,
                reason: format!("{:#}", e),
            });
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.dispatch(Event::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemoryPlayer;
    use crate::config::Config;
    use crate::history::History;
    use anyhow::anyhow;

    struct Echo;

    impl TranslationBackend for Echo {
        fn translate(&self, text: &str, _from: &str, to: &str) -> Result<String> {
            Ok(format!("{} [{}]", text, to))
        }
    }

    struct Broken;

    impl TranslationBackend for Broken {
        fn translate(&self, _text: &str, _from: &str, _to: &str) -> Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    impl SpeechBackend for Broken {
        fn synthesize(&self, _prompt: &str, _voice: &str) -> Result<String> {
            Err(anyhow!("No audio data returned from Gemini API"))
        }
    }

    struct Tone;

    impl SpeechBackend for Tone {
        fn synthesize(&self, _prompt: &str, _voice: &str) -> Result<String> {
            Ok("AAD/fw==".to_string())
        }
    }

    fn runtime(
        translator: Arc<dyn TranslationBackend>,
        speaker: Arc<dyn SpeechBackend>,
        player: MemoryPlayer,
    ) -> Runtime {
        let config = Config {
            source_lang: "en".to_string(),
            ..Config::default()
        };
        let session = Session::new(SessionState::from_config(&config, History::new()));
        Runtime::new(session, translator, speaker, Box::new(player))
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn translation_round_trip() {
        let mut rt = runtime(Arc::new(Echo), Arc::new(Tone), MemoryPlayer::new());
        rt.dispatch(Event::SetInput("hello".to_string()));
        rt.translate();
        assert!(rt.wait_idle(WAIT));
        assert_eq!(rt.state().translated_text, "hello [Bengali (বাংলা)]");
        assert_eq!(rt.state().history.len(), 1);
    }

    #[test]
    fn backend_errors_become_banners() {
        let mut rt = runtime(Arc::new(Broken), Arc::new(Broken), MemoryPlayer::new());
        rt.dispatch(Event::SetInput("hello".to_string()));
        rt.translate();
        assert!(rt.wait_idle(WAIT));
        assert_eq!(
            rt.state().error.map(|e| e.to_string()).as_deref(),
            Some("Translation failed. Check connection.")
        );
    }

    #[test]
    fn playback_start_failure_is_reported() {
        let player = MemoryPlayer::new();
        player.fail_next_start();
        let mut rt = runtime(Arc::new(Echo), Arc::new(Tone), player.clone());
        rt.dispatch(Event::SetInput("hello".to_string()));
        rt.translate();
        assert!(rt.wait_idle(WAIT));
        rt.speak();
        assert!(rt.wait_idle(WAIT));

        assert!(!rt.state().is_speaking());
        assert!(rt.download().is_none());
        assert!(player.started_ids().is_empty());
        assert!(rt.state().error.is_some());
    }

    #[test]
    fn save_without_audio_fails() {
        let rt = runtime(Arc::new(Echo), Arc::new(Tone), MemoryPlayer::new());
        let dir = tempfile::tempdir().unwrap();
        assert!(rt.save_download(&dir.path().join(DEFAULT_DOWNLOAD_NAME)).is_err());
    }

    #[test]
    fn microphone_is_unavailable() {
        let mut rt = runtime(Arc::new(Echo), Arc::new(Tone), MemoryPlayer::new());
        rt.dispatch(Event::ToggleListening);
        assert!(!rt.state().is_listening);
        assert_eq!(
            rt.state().error,
            Some(crate::error::SessionError::RecognitionUnsupported)
        );
    }

    #[test]
    fn drop_stops_active_playback() {
        let player = MemoryPlayer::new();
        let mut rt = runtime(Arc::new(Echo), Arc::new(Tone), player.clone());
        rt.dispatch(Event::SetInput("hello".to_string()));
        rt.translate();
        assert!(rt.wait_idle(WAIT));
        rt.speak();
        assert!(rt.wait_idle(WAIT));
        let playing = player.active().unwrap();

        drop(rt);
        assert_eq!(player.stopped_ids(), vec![playing]);
        assert_eq!(player.active(), None);
    }
}
