//! Software audio engine for Stretto
//!
//! Implements [`stretto_audio::AudioBackend`] in-process: tracks are staged
//! in an in-memory filesystem, decoded fully with Symphonia, and rendered by
//! a mixer the audio callback reaches through a [`Renderer`].

mod decode;
mod engine;
mod fs;
mod mixer;
mod pitch;

pub use decode::{decode, DecodeError, DecodedSound};
pub use engine::{Renderer, SoftwareEngine};
pub use fs::MemoryFs;
pub use mixer::{DspUnit, LoadedSound, Mixer, Voice};
pub use pitch::PitchShifter;
