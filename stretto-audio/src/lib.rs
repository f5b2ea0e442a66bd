//! Playback control for Stretto - tempo, pitch correction and track sessions
//!
//! This crate holds the control logic only; decoding and DSP live behind
//! the [`AudioBackend`] contract:
//! - Tempo: multiplier policy and the frequency/pitch parameters derived from it
//! - Session: engine handles owned for one loaded track
//! - Gate: control enablement and display signals
//! - Player: the entry point tying the above to an engine

mod backend;
mod error;
mod gate;
mod player;
mod session;
mod settings;
mod tempo;
mod vfs;

#[cfg(test)]
mod testing;

pub use backend::{
    pitch_shift, AudioBackend, ChannelId, DspId, DspType, EngineError, InitFlags, SoundId,
    SoundMode, TimeUnit,
};
pub use error::PlayerError;
pub use gate::{Control, UiEvent, UiGate, STATUS_LOADING, STATUS_PROCESSING, STATUS_READY};
pub use player::{clamp_position, Player, Transport};
pub use session::{Session, SessionState};
pub use settings::{PlayerSettings, TRACK_PATH};
pub use tempo::{
    format_multiplier, round_to_hundredths, PitchMode, Step, TempoController, TempoLimits,
    TempoParams,
};
pub use vfs::{Removal, VfsError, VirtualFs};
