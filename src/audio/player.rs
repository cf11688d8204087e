//! Playback engines
//!
//! An engine owns at most one active playback. Starting a new one releases the
//! previous handle first, and every exit path (natural end, stop, error, drop)
//! releases the handle it holds.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::AudioBuffer;

/// Handle of one playback started by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(pub u64);

/// Completion callback fired by the audio platform when playback runs out.
/// It is never fired for a playback that was stopped or replaced.
pub type OnPlaybackEnd = Box<dyn FnOnce() + Send + 'static>;

pub trait PlaybackEngine: Send {
    /// Begin playing `buffer`, replacing any active playback.
    fn start(
        &mut self,
        id: PlaybackId,
        buffer: AudioBuffer,
        on_end: OnPlaybackEnd,
    ) -> anyhow::Result<()>;

    /// Halt `id` immediately. Unknown or finished ids are ignored.
    fn stop(&mut self, id: PlaybackId);

    /// Currently held playback, if any
    fn active(&self) -> Option<PlaybackId>;
}

// --- SILENT PLAYER ---

/// Plays into nothing, but keeps real timing: the end callback fires after the
/// buffer's duration unless the playback is stopped first.
#[derive(Default)]
pub struct SilentPlayer {
    active: Option<SilentPlayback>,
}

struct SilentPlayback {
    id: PlaybackId,
    // Dropping the sender cancels the timer thread
    _cancel: mpsc::Sender<()>,
}

impl SilentPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaybackEngine for SilentPlayer {
    fn start(
        &mut self,
        id: PlaybackId,
        buffer: AudioBuffer,
        on_end: OnPlaybackEnd,
    ) -> anyhow::Result<()> {
        self.active = None;

        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let duration = Duration::from_secs_f32(buffer.duration_secs());
        thread::Builder::new()
            .name(format!("silent-playback-{}", id.0))
            .spawn(move || {
                if let Err(mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(duration) {
                    on_end();
                }
            })?;

        self.active = Some(SilentPlayback {
            id,
            _cancel: cancel_tx,
        });
        Ok(())
    }

    fn stop(&mut self, id: PlaybackId) {
        if self.active.as_ref().map(|p| p.id) == Some(id) {
            self.active = None;
        }
    }

    fn active(&self) -> Option<PlaybackId> {
        self.active.as_ref().map(|p| p.id)
    }
}

// --- MEMORY PLAYER ---

/// Shared record of what a [`MemoryPlayer`] was asked to do
#[derive(Default)]
pub struct PlaybackLog {
    pub started: Vec<(PlaybackId, AudioBuffer)>,
    pub stopped: Vec<PlaybackId>,
    pending: Option<(PlaybackId, OnPlaybackEnd)>,
    fail_next: bool,
}

/// Engine that never ends on its own; tests drive completion with
/// [`MemoryPlayer::finish`].
#[derive(Clone, Default)]
pub struct MemoryPlayer {
    log: Arc<Mutex<PlaybackLog>>,
}

impl MemoryPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<PlaybackLog>> {
        self.log.clone()
    }

    /// Make the next `start` fail as if no output device was available
    pub fn fail_next_start(&self) {
        self.log.lock().fail_next = true;
    }

    /// Simulate the platform reporting the end of `id`. Returns false when
    /// `id` is not the active playback.
    pub fn finish(&self, id: PlaybackId) -> bool {
        let pending = {
            let mut log = self.log.lock();
            match log.pending.take() {
                Some((active, on_end)) if active == id => Some(on_end),
                other => {
                    log.pending = other;
                    None
                }
            }
        };
        match pending {
            Some(on_end) => {
                on_end();
                true
            }
            None => false,
        }
    }

    pub fn started_ids(&self) -> Vec<PlaybackId> {
        self.log.lock().started.iter().map(|(id, _)| *id).collect()
    }

    pub fn stopped_ids(&self) -> Vec<PlaybackId> {
        self.log.lock().stopped.clone()
    }
}

impl PlaybackEngine for MemoryPlayer {
    fn start(
        &mut self,
        id: PlaybackId,
        buffer: AudioBuffer,
        on_end: OnPlaybackEnd,
    ) -> anyhow::Result<()> {
        let mut log = self.log.lock();
        log.pending = None;
        if std::mem::take(&mut log.fail_next) {
            anyhow::bail!("no audio output device available");
        }
        log.started.push((id, buffer));
        log.pending = Some((id, on_end));
        Ok(())
    }

    fn stop(&mut self, id: PlaybackId) {
        let mut log = self.log.lock();
        if log.pending.as_ref().map(|(active, _)| *active) == Some(id) {
            log.pending = None;
            log.stopped.push(id);
        }
    }

    fn active(&self) -> Option<PlaybackId> {
        self.log.lock().pending.as_ref().map(|(id, _)| *id)
    }
}

// --- SPEAKER PLAYER ---

#[cfg(feature = "speaker")]
pub use speaker::SpeakerPlayer;

#[cfg(feature = "speaker")]
mod speaker {
    use super::*;
    use anyhow::anyhow;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    /// Playback sample rate (48kHz - most devices support this)
    const PLAYBACK_SAMPLE_RATE: u32 = 48000;

    enum Command {
        Start {
            id: PlaybackId,
            buffer: AudioBuffer,
            on_end: OnPlaybackEnd,
            reply: mpsc::Sender<anyhow::Result<()>>,
        },
        Stop(PlaybackId),
    }

    /// Output through the default cpal device.
    ///
    /// cpal streams are not `Send` on every host, so the stream lives on a
    /// dedicated thread and this handle only forwards commands to it.
    pub struct SpeakerPlayer {
        commands: mpsc::Sender<Command>,
        active: Option<PlaybackId>,
    }

    struct Cursor {
        samples: Vec<f32>,
        position: usize,
        on_end: Option<OnPlaybackEnd>,
    }

    impl SpeakerPlayer {
        pub fn new() -> anyhow::Result<Self> {
            let (tx, rx) = mpsc::channel();
            thread::Builder::new()
                .name("speaker-playback".to_string())
                .spawn(move || run_player_thread(rx))?;
            Ok(Self {
                commands: tx,
                active: None,
            })
        }
    }

    impl PlaybackEngine for SpeakerPlayer {
        fn start(
            &mut self,
            id: PlaybackId,
            buffer: AudioBuffer,
            on_end: OnPlaybackEnd,
        ) -> anyhow::Result<()> {
            self.active = None;
            let (reply_tx, reply_rx) = mpsc::channel();
            self.commands
                .send(Command::Start {
                    id,
                    buffer,
                    on_end,
                    reply: reply_tx,
                })
                .map_err(|_| anyhow!("speaker thread is gone"))?;
            reply_rx
                .recv()
                .map_err(|_| anyhow!("speaker thread is gone"))??;
            self.active = Some(id);
            Ok(())
        }

        fn stop(&mut self, id: PlaybackId) {
            if self.active == Some(id) {
                self.active = None;
                let _ = self.commands.send(Command::Stop(id));
            }
        }

        fn active(&self) -> Option<PlaybackId> {
            self.active
        }
    }

    fn run_player_thread(commands: mpsc::Receiver<Command>) {
        let mut current: Option<(PlaybackId, cpal::Stream)> = None;

        while let Ok(command) = commands.recv() {
            match command {
                Command::Start {
                    id,
                    buffer,
                    on_end,
                    reply,
                } => {
                    // Release the previous stream before opening a new one
                    current = None;
                    let result = open_stream(&buffer, on_end).map(|stream| {
                        current = Some((id, stream));
                    });
                    let _ = reply.send(result);
                }
                Command::Stop(id) => {
                    if current.as_ref().map(|(active, _)| *active) == Some(id) {
                        current = None;
                    }
                }
            }
        }
    }

    fn open_stream(buffer: &AudioBuffer, on_end: OnPlaybackEnd) -> anyhow::Result<cpal::Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no audio output device found"))?;

        // Stereo at 48kHz since many devices don't support 24kHz mono
        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(PLAYBACK_SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let cursor = Arc::new(Mutex::new(Cursor {
            samples: upsample(buffer),
            position: 0,
            on_end: Some(on_end),
        }));
        let cursor_cb = cursor.clone();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut cursor = cursor_cb.lock();
                for frame in data.chunks_mut(2) {
                    let sample = cursor.samples.get(cursor.position).copied().unwrap_or(0.0);
                    cursor.position += 1;
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }
                if cursor.position >= cursor.samples.len() {
                    if let Some(on_end) = cursor.on_end.take() {
                        on_end();
                    }
                }
            },
            |err| tracing::warn!("speaker stream error: {}", err),
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }

    /// Mono source at any rate to the 48kHz playback rate (sample repetition)
    fn upsample(buffer: &AudioBuffer) -> Vec<f32> {
        let source = buffer.channel(0).unwrap_or(&[]);
        let factor = (PLAYBACK_SAMPLE_RATE / buffer.sample_rate().max(1)).max(1) as usize;
        source
            .iter()
            .flat_map(|s| std::iter::repeat(*s).take(factor))
            .collect()
    }
}
