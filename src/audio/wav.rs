//! Minimal RIFF/WAVE writer for raw PCM

use std::fs;
use std::path::Path;

use anyhow::Context;

use super::{DecodeAudioError, SOURCE_BITS_PER_SAMPLE, SOURCE_CHANNELS, SOURCE_SAMPLE_RATE};

/// Size of the canonical PCM header (RIFF + fmt + data descriptors)
pub const WAV_HEADER_LEN: usize = 44;

/// Format parameters written into the `fmt ` sub-chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// The fixed format of Gemini speech output
    pub const fn gemini() -> Self {
        Self {
            channels: SOURCE_CHANNELS,
            sample_rate: SOURCE_SAMPLE_RATE,
            bits_per_sample: SOURCE_BITS_PER_SAMPLE,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bits_per_sample as u32 / 8
    }
}

impl Default for WavSpec {
    fn default() -> Self {
        Self::gemini()
    }
}

/// Wrap 16-bit mono 24kHz PCM in a WAV container.
///
/// The output is exactly `44 + pcm.len()` bytes. Input whose length is not a
/// whole number of samples is rejected.
pub fn encode_wav(pcm: &[u8]) -> Result<Vec<u8>, DecodeAudioError> {
    encode_wav_with(WavSpec::gemini(), pcm)
}

pub fn encode_wav_with(spec: WavSpec, pcm: &[u8]) -> Result<Vec<u8>, DecodeAudioError> {
    let sample_bytes = (spec.bits_per_sample / 8).max(1) as usize;
    if pcm.len() % sample_bytes != 0 {
        return Err(DecodeAudioError::OddLength(pcm.len()));
    }
    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|len| len.checked_add(36).is_some())
        .ok_or_else(|| DecodeAudioError::Allocation(format!("{} bytes exceed RIFF limits", pcm.len())))?;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

    // RIFF descriptor
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&spec.channels.to_le_bytes());
    wav.extend_from_slice(&spec.sample_rate.to_le_bytes());
    wav.extend_from_slice(&spec.byte_rate().to_le_bytes());
    wav.extend_from_slice(&spec.block_align().to_le_bytes());
    wav.extend_from_slice(&spec.bits_per_sample.to_le_bytes());

    // data sub-chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);

    Ok(wav)
}

/// Identifier of a downloadable resource held by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

/// A finished WAV file exposed for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavResource {
    pub id: ResourceId,
    pub bytes: Vec<u8>,
}

impl WavResource {
    pub fn new(id: ResourceId, bytes: Vec<u8>) -> Self {
        Self { id, bytes }
    }

    /// Length of the sample payload in seconds
    pub fn duration_secs(&self) -> f32 {
        let spec = WavSpec::gemini();
        let data = self.bytes.len().saturating_sub(WAV_HEADER_LEN);
        data as f32 / spec.byte_rate() as f32
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, &self.bytes).with_context(|| format!("writing {}", path.display()))
    }
}
