//! Playback session - the engine handles owned for one loaded track

use crate::backend::{AudioBackend, ChannelId, DspId, EngineError, SoundId};

/// Lifecycle of the player's track slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing loaded
    #[default]
    Empty,
    /// Waiting for track bytes or building engine handles; further loads are rejected
    Loading,
    /// A session is live
    Active,
    /// The last load failed; nothing is live
    Failed,
}

/// Engine handles for one loaded track
///
/// Not `Clone`: exactly one owner releases the handles, once.
#[derive(Debug)]
pub struct Session {
    sound: SoundId,
    channel: ChannelId,
    pitch_unit: Option<DspId>,
    /// Channel's native frequency, captured at load time
    base_frequency: f32,
}

impl Session {
    pub(crate) fn new(
        sound: SoundId,
        channel: ChannelId,
        pitch_unit: Option<DspId>,
        base_frequency: f32,
    ) -> Self {
        Self {
            sound,
            channel,
            pitch_unit,
            base_frequency,
        }
    }

    pub fn sound(&self) -> SoundId {
        self.sound
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn pitch_unit(&self) -> Option<DspId> {
        self.pitch_unit
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Whether the pitch-correction feature is available for this track
    pub fn has_pitch_unit(&self) -> bool {
        self.pitch_unit.is_some()
    }

    /// Stop the channel, then release the pitch unit and the sound
    ///
    /// Every release is attempted even if an earlier one fails; the first
    /// error is returned.
    pub fn release<B: AudioBackend + ?Sized>(self, backend: &mut B) -> Result<(), EngineError> {
        let stopped = backend.stop(self.channel);
        let dsp_released = match self.pitch_unit {
            Some(dsp) => backend.release_dsp(dsp),
            None => Ok(()),
        };
        let sound_released = backend.release_sound(self.sound);
        stopped.and(dsp_released).and(sound_released)
    }
}
