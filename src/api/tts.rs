//! Expressive speech synthesis through the Gemini TTS model
//!
//! The model answers with a single inline audio part holding base64 encoded
//! 24kHz mono PCM. Decoding is left to the audio pipeline.

use anyhow::{anyhow, Result};

use super::client::GeminiClient;
use super::SpeechBackend;

impl SpeechBackend for GeminiClient {
    fn synthesize(&self, prompt: &str, voice: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": {
                            "voiceName": voice
                        }
                    }
                }
            }
        });

        let response = self.generate_content(&self.tts_model, &body)?;
        response
            .audio_data()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("No audio data returned from Gemini API"))
    }
}
