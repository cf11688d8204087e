use thiserror::Error;

/// Failures surfaced to the user as a single transient banner.
///
/// None of these is fatal: the session always returns to an idle state from
/// which the action can be retried.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Translation failed. Check connection.")]
    NetworkFailure,

    #[error("Offline mode active. Only basic phrases work without internet.")]
    OfflineUnsupportedPhrase,

    #[error("Microphone access denied.")]
    MicrophonePermissionDenied,

    #[error("Speech recognition not supported.")]
    RecognitionUnsupported,

    #[error("Voice synthesis failed.")]
    SynthesisFailed,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
