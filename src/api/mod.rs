pub mod client;
pub mod text;
pub mod tts;
pub mod types;

pub use client::GeminiClient;
pub use text::translation_prompt;

/// Text-in/text-out translation collaborator
pub trait TranslationBackend: Send + Sync {
    /// `from`/`to` are human-readable language names
    fn translate(&self, text: &str, from: &str, to: &str) -> anyhow::Result<String>;
}

/// Prompt-in/audio-out speech collaborator. Returns the base64 PCM payload.
pub trait SpeechBackend: Send + Sync {
    fn synthesize(&self, prompt: &str, voice: &str) -> anyhow::Result<String>;
}
