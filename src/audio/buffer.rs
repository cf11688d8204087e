use super::DecodeAudioError;

/// Sample rates accepted by platform audio buffers
const MIN_SAMPLE_RATE: u32 = 3000;
const MAX_SAMPLE_RATE: u32 = 768_000;
const MAX_CHANNELS: u16 = 32;

/// Decoded, channel-separated float samples ready for playback.
///
/// Built once from raw PCM and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Decode interleaved signed 16-bit little-endian PCM.
    ///
    /// Each sample maps to `value / 32768.0`, so the int16 range lands in
    /// `[-1.0, 0.99997]` without clipping.
    pub fn from_pcm16(
        bytes: &[u8],
        sample_rate: u32,
        num_channels: u16,
    ) -> Result<Self, DecodeAudioError> {
        if bytes.len() % 2 != 0 {
            return Err(DecodeAudioError::OddLength(bytes.len()));
        }
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return Err(DecodeAudioError::Allocation(format!(
                "unsupported channel count {}",
                num_channels
            )));
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(DecodeAudioError::Allocation(format!(
                "unsupported sample rate {}",
                sample_rate
            )));
        }

        let total_samples = bytes.len() / 2;
        let channel_count = num_channels as usize;
        if total_samples % channel_count != 0 {
            return Err(DecodeAudioError::ChannelMismatch {
                samples: total_samples,
                channels: num_channels,
            });
        }
        let frame_count = total_samples / channel_count;
        if frame_count == 0 {
            return Err(DecodeAudioError::Allocation(
                "buffer length must be at least one frame".to_string(),
            ));
        }

        let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
        for (i, chunk) in bytes.chunks_exact(2).enumerate() {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            channels[i % channel_count].push(sample as f32 / 32768.0);
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel
    pub fn len(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn duration_secs(&self) -> f32 {
        self.len() as f32 / self.sample_rate as f32
    }
}
