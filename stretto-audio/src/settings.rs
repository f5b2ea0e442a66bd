//! Player settings

use crate::backend::SoundMode;
use crate::tempo::{Step, TempoController, TempoLimits};

/// Where track bytes are staged in the engine's filesystem
pub const TRACK_PATH: &str = "/track.mp3";

/// Tunables for [`crate::Player`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Channel budget requested at engine init
    pub max_channels: u32,
    pub tempo_limits: TempoLimits,
    pub tempo_small_step: f32,
    pub tempo_large_step: f32,
    pub seek_small_ms: u32,
    pub seek_large_ms: u32,
    /// Channel volume on load (0.0 - 1.0)
    pub volume: f32,
    /// Start playing as soon as a track is loaded
    pub autoplay: bool,
    /// Window size handed to the pitch-shift unit
    pub pitch_window: i32,
    pub sound_mode: SoundMode,
    pub track_path: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            max_channels: 2048,
            tempo_limits: TempoLimits::default(),
            tempo_small_step: TempoController::SMALL_STEP,
            tempo_large_step: TempoController::LARGE_STEP,
            seek_small_ms: 5_000,
            seek_large_ms: 25_000,
            volume: 0.5,
            autoplay: true,
            pitch_window: 4096,
            sound_mode: SoundMode::default(),
            track_path: TRACK_PATH.to_string(),
        }
    }
}

impl PlayerSettings {
    /// Seek distance for a step
    pub fn seek_ms(&self, step: Step) -> u32 {
        match step {
            Step::Small => self.seek_small_ms,
            Step::Large => self.seek_large_ms,
        }
    }

    pub(crate) fn tempo_controller(&self) -> TempoController {
        TempoController::new(self.tempo_limits)
            .with_steps(self.tempo_small_step, self.tempo_large_step)
    }
}
