//! Audio pipeline for synthesized speech
//!
//! Gemini returns speech as base64 encoded raw PCM (signed 16-bit,
//! little-endian, mono, 24kHz). The payload is turned into two independent
//! products: a WAV file the user can download, and a float buffer that is
//! handed to the playback engine.

pub mod buffer;
pub mod pcm;
pub mod player;
pub mod wav;

use thiserror::Error;

pub use buffer::AudioBuffer;
pub use pcm::decode_base64;
pub use player::{MemoryPlayer, PlaybackEngine, PlaybackId, SilentPlayer};
pub use wav::{encode_wav, WavResource, WavSpec};

/// Output audio sample rate from Gemini (24kHz)
pub const SOURCE_SAMPLE_RATE: u32 = 24000;

/// Gemini speech is always mono
pub const SOURCE_CHANNELS: u16 = 1;

/// Bits per sample of the raw payload
pub const SOURCE_BITS_PER_SAMPLE: u16 = 16;

/// Failure to turn a base64 payload into bytes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Failure to turn raw PCM bytes into a WAV resource or an audio buffer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeAudioError {
    #[error("PCM byte length {0} is not a multiple of the 2-byte sample size")]
    OddLength(usize),

    #[error("{samples} samples cannot be split evenly into {channels} channels")]
    ChannelMismatch { samples: usize, channels: u16 },

    #[error("cannot allocate audio buffer: {0}")]
    Allocation(String),
}

/// Failure anywhere between the base64 payload and a playable buffer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeechDecodeError {
    #[error(transparent)]
    Payload(#[from] DecodeError),

    #[error(transparent)]
    Audio(#[from] DecodeAudioError),
}

/// Both products of one synthesized utterance
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSpeech {
    /// Complete WAV file for download
    pub wav: Vec<u8>,
    /// Float samples for immediate playback
    pub buffer: AudioBuffer,
}

/// Run the whole pipeline: base64 → PCM → (WAV, buffer). Nothing is returned
/// unless every stage succeeds.
pub fn decode_speech(payload: &str) -> Result<DecodedSpeech, SpeechDecodeError> {
    let pcm = decode_base64(payload)?;
    let wav = encode_wav(&pcm)?;
    let buffer = AudioBuffer::from_pcm16(&pcm, SOURCE_SAMPLE_RATE, SOURCE_CHANNELS)?;
    Ok(DecodedSpeech { wav, buffer })
}
