//! Contract of the native audio engine the player drives
//!
//! The player never decodes or processes audio itself. It owns typed handles
//! into an engine implementing [`AudioBackend`] and pushes parameters to it.

use crate::vfs::{Removal, VfsError, VirtualFs};
use thiserror::Error;

/// Errors reported by an audio engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Engine not initialized")]
    NotInitialized,
    #[error("Engine initialization failed: {0}")]
    Init(String),
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Unsupported or corrupt audio data: {0}")]
    Format(String),
    #[error("Invalid handle")]
    InvalidHandle,
    #[error("Out of channels")]
    ChannelsExhausted,
    #[error("Unsupported DSP type: {0:?}")]
    UnsupportedDsp(DspType),
    #[error("Invalid DSP parameter index {0}")]
    InvalidParameter(u32),
    #[error(transparent)]
    Vfs(#[from] VfsError),
}

/// Handle to a decoded sound owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub u32);

/// Handle to one playing instance of a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u32);

/// Handle to a DSP unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DspId(pub u32);

/// Engine initialization flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitFlags {
    #[default]
    Normal,
}

/// How a sound is created from its source data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundMode {
    /// Wrap to the start when playback reaches the end
    pub looping: bool,
}

impl Default for SoundMode {
    fn default() -> Self {
        Self { looping: true }
    }
}

/// Units for positions and lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// Milliseconds
    Ms,
    /// Sample frames at the sound's native rate
    Pcm,
}

/// DSP unit types the player knows how to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DspType {
    PitchShift,
}

/// Parameter indices of the pitch-shift unit
pub mod pitch_shift {
    /// Pitch ratio (float, 1.0 = unchanged)
    pub const PITCH: u32 = 0;
    /// Analysis window size in samples (int)
    pub const FFT_SIZE: u32 = 1;
}

/// The native audio engine consumed by the player
pub trait AudioBackend: VirtualFs {
    /// Bring the engine up with room for `max_channels` simultaneous channels
    fn init(&mut self, max_channels: u32, flags: InitFlags) -> Result<(), EngineError>;

    /// Create a sound from a file previously staged in the virtual filesystem
    fn create_sound(&mut self, path: &str, mode: SoundMode) -> Result<SoundId, EngineError>;

    /// Stage `bytes` at `path` and create a sound from it
    ///
    /// Any previous file at `path` is removed first; a missing file is fine.
    fn create_sound_from_bytes(
        &mut self,
        path: &str,
        bytes: &[u8],
        mode: SoundMode,
    ) -> Result<SoundId, EngineError> {
        if self.unlink(path)? == Removal::Removed {
            tracing::debug!("Replaced staged file {}", path);
        }
        self.write_file(path, bytes)?;
        self.create_sound(path, mode)
    }

    fn release_sound(&mut self, sound: SoundId) -> Result<(), EngineError>;

    /// Start a channel for `sound`, optionally paused
    fn play_sound(&mut self, sound: SoundId, paused: bool) -> Result<ChannelId, EngineError>;

    fn sound_length(&self, sound: SoundId, unit: TimeUnit) -> Result<u32, EngineError>;

    /// Output frequency of the channel in Hz
    fn frequency(&self, channel: ChannelId) -> Result<f32, EngineError>;
    fn set_frequency(&mut self, channel: ChannelId, hz: f32) -> Result<(), EngineError>;

    fn position(&self, channel: ChannelId, unit: TimeUnit) -> Result<u32, EngineError>;
    fn set_position(
        &mut self,
        channel: ChannelId,
        position: u32,
        unit: TimeUnit,
    ) -> Result<(), EngineError>;

    fn set_volume(&mut self, channel: ChannelId, volume: f32) -> Result<(), EngineError>;
    fn paused(&self, channel: ChannelId) -> Result<bool, EngineError>;
    fn set_paused(&mut self, channel: ChannelId, paused: bool) -> Result<(), EngineError>;

    /// Stop the channel; its handle becomes invalid
    fn stop(&mut self, channel: ChannelId) -> Result<(), EngineError>;

    fn create_dsp(&mut self, kind: DspType) -> Result<DspId, EngineError>;
    fn set_dsp_parameter_int(&mut self, dsp: DspId, index: u32, value: i32)
        -> Result<(), EngineError>;
    fn set_dsp_parameter_float(
        &mut self,
        dsp: DspId,
        index: u32,
        value: f32,
    ) -> Result<(), EngineError>;

    /// Insert `dsp` into the channel's chain at `index` (0 = head)
    fn add_dsp(&mut self, channel: ChannelId, index: usize, dsp: DspId)
        -> Result<(), EngineError>;
    fn release_dsp(&mut self, dsp: DspId) -> Result<(), EngineError>;

    fn suspend_mixer(&mut self) -> Result<(), EngineError>;
    fn resume_mixer(&mut self) -> Result<(), EngineError>;
}
