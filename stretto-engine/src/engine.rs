//! Software engine - implements the playback contract on top of the mixer

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use stretto_audio::{
    pitch_shift, AudioBackend, ChannelId, DspId, DspType, EngineError, InitFlags, Removal,
    SoundId, SoundMode, TimeUnit, VfsError, VirtualFs,
};
use tracing::{debug, info};

use crate::decode::decode;
use crate::fs::MemoryFs;
use crate::mixer::{DspUnit, LoadedSound, Mixer, Voice};

/// Handle for the audio callback
///
/// Cheap to clone; every clone renders the same mixer.
#[derive(Clone)]
pub struct Renderer {
    mixer: Arc<Mutex<Mixer>>,
}

impl Renderer {
    /// Fill `output` (interleaved, `channels` wide)
    pub fn render(&self, output: &mut [f32], channels: usize) {
        // try_lock keeps the audio thread from blocking; contention means silence
        match self.mixer.try_lock() {
            Some(mut mixer) => mixer.render(output, channels),
            None => output.fill(0.0),
        }
    }
}

/// In-process audio engine
pub struct SoftwareEngine {
    fs: MemoryFs,
    mixer: Arc<Mutex<Mixer>>,
    initialized: bool,
    max_channels: u32,
    next_id: u32,
}

impl SoftwareEngine {
    /// Create an engine rendering at `output_rate` Hz
    pub fn new(output_rate: u32) -> Self {
        Self {
            fs: MemoryFs::new(),
            mixer: Arc::new(Mutex::new(Mixer::new(output_rate))),
            initialized: false,
            max_channels: 0,
            next_id: 1,
        }
    }

    pub fn renderer(&self) -> Renderer {
        Renderer {
            mixer: self.mixer.clone(),
        }
    }

    pub fn output_rate(&self) -> u32 {
        self.mixer.lock().output_rate()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn ensure_init(&self) -> Result<(), EngineError> {
        if self.initialized {
            Ok(())
        } else {
            Err(EngineError::NotInitialized)
        }
    }

    fn with_voice<T>(
        &self,
        channel: ChannelId,
        f: impl FnOnce(&mut Voice) -> T,
    ) -> Result<T, EngineError> {
        let mut mixer = self.mixer.lock();
        let voice = mixer
            .voices
            .get_mut(&channel)
            .ok_or(EngineError::InvalidHandle)?;
        Ok(f(voice))
    }
}

impl VirtualFs for SoftwareEngine {
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), VfsError> {
        self.fs.write_file(path, bytes)
    }

    fn unlink(&mut self, path: &str) -> Result<Removal, VfsError> {
        self.fs.unlink(path)
    }
}

impl AudioBackend for SoftwareEngine {
    fn init(&mut self, max_channels: u32, flags: InitFlags) -> Result<(), EngineError> {
        if max_channels == 0 {
            return Err(EngineError::Init("channel count must be positive".into()));
        }
        self.max_channels = max_channels;
        self.initialized = true;
        info!(
            "Software engine up: {} Hz, {} channels, {:?}",
            self.output_rate(),
            max_channels,
            flags
        );
        Ok(())
    }

    fn create_sound(&mut self, path: &str, mode: SoundMode) -> Result<SoundId, EngineError> {
        self.ensure_init()?;
        let bytes = self
            .fs
            .read(path)
            .ok_or_else(|| EngineError::FileNotFound(path.to_string()))?;
        let extension = Path::new(path).extension().and_then(|e| e.to_str());
        let decoded = decode(bytes, extension).map_err(|e| EngineError::Format(e.to_string()))?;
        debug!(
            "Decoded {}: {} frames at {} Hz",
            path,
            decoded.frames(),
            decoded.sample_rate
        );

        let id = SoundId(self.next_id());
        self.mixer
            .lock()
            .sounds
            .insert(id, LoadedSound { decoded, mode });
        Ok(id)
    }

    fn release_sound(&mut self, sound: SoundId) -> Result<(), EngineError> {
        let mut mixer = self.mixer.lock();
        mixer
            .sounds
            .remove(&sound)
            .ok_or(EngineError::InvalidHandle)?;
        // Channels die with their sound
        mixer.voices.retain(|_, v| v.sound != sound);
        Ok(())
    }

    fn play_sound(&mut self, sound: SoundId, paused: bool) -> Result<ChannelId, EngineError> {
        self.ensure_init()?;
        let id = ChannelId(self.next_id());
        let mut mixer = self.mixer.lock();
        if mixer.voices.len() >= self.max_channels as usize {
            return Err(EngineError::ChannelsExhausted);
        }
        let loaded = mixer.sounds.get(&sound).ok_or(EngineError::InvalidHandle)?;
        let voice = Voice::new(sound, &loaded.decoded, loaded.mode.looping, paused);
        mixer.voices.insert(id, voice);
        Ok(id)
    }

    fn sound_length(&self, sound: SoundId, unit: TimeUnit) -> Result<u32, EngineError> {
        let mixer = self.mixer.lock();
        let decoded = &mixer
            .sounds
            .get(&sound)
            .ok_or(EngineError::InvalidHandle)?
            .decoded;
        Ok(match unit {
            TimeUnit::Ms => decoded.length_ms(),
            TimeUnit::Pcm => decoded.frames() as u32,
        })
    }

    fn frequency(&self, channel: ChannelId) -> Result<f32, EngineError> {
        self.with_voice(channel, |v| v.frequency)
    }

    fn set_frequency(&mut self, channel: ChannelId, hz: f32) -> Result<(), EngineError> {
        self.with_voice(channel, |v| v.frequency = hz.max(0.0))
    }

    fn position(&self, channel: ChannelId, unit: TimeUnit) -> Result<u32, EngineError> {
        self.with_voice(channel, |v| match unit {
            TimeUnit::Ms => v.position_ms(),
            TimeUnit::Pcm => v.position as u32,
        })
    }

    fn set_position(
        &mut self,
        channel: ChannelId,
        position: u32,
        unit: TimeUnit,
    ) -> Result<(), EngineError> {
        self.with_voice(channel, |v| {
            let frames = match unit {
                // Nearest frame, so reading the position back gives the same ms
                TimeUnit::Ms => ((position as u64 * v.native_rate as u64 + 500) / 1000) as u32,
                TimeUnit::Pcm => position,
            };
            v.set_position_frames(frames);
        })
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) -> Result<(), EngineError> {
        self.with_voice(channel, |v| v.volume = volume.clamp(0.0, 1.0))
    }

    fn paused(&self, channel: ChannelId) -> Result<bool, EngineError> {
        self.with_voice(channel, |v| v.paused)
    }

    fn set_paused(&mut self, channel: ChannelId, paused: bool) -> Result<(), EngineError> {
        self.with_voice(channel, |v| v.paused = paused)
    }

    fn stop(&mut self, channel: ChannelId) -> Result<(), EngineError> {
        self.mixer
            .lock()
            .voices
            .remove(&channel)
            .map(|_| ())
            .ok_or(EngineError::InvalidHandle)
    }

    fn create_dsp(&mut self, kind: DspType) -> Result<DspId, EngineError> {
        self.ensure_init()?;
        let id = DspId(self.next_id());
        self.mixer.lock().dsps.insert(id, DspUnit::new(kind));
        Ok(id)
    }

    fn set_dsp_parameter_int(
        &mut self,
        dsp: DspId,
        index: u32,
        value: i32,
    ) -> Result<(), EngineError> {
        let mut mixer = self.mixer.lock();
        let unit = mixer.dsps.get_mut(&dsp).ok_or(EngineError::InvalidHandle)?;
        match (unit, index) {
            (DspUnit::PitchShift(shifter), pitch_shift::FFT_SIZE) => {
                shifter.set_window(value.max(0) as usize);
                Ok(())
            }
            _ => Err(EngineError::InvalidParameter(index)),
        }
    }

    fn set_dsp_parameter_float(
        &mut self,
        dsp: DspId,
        index: u32,
        value: f32,
    ) -> Result<(), EngineError> {
        let mut mixer = self.mixer.lock();
        let unit = mixer.dsps.get_mut(&dsp).ok_or(EngineError::InvalidHandle)?;
        match (unit, index) {
            (DspUnit::PitchShift(shifter), pitch_shift::PITCH) => {
                shifter.set_ratio(value);
                Ok(())
            }
            _ => Err(EngineError::InvalidParameter(index)),
        }
    }

    fn add_dsp(&mut self, channel: ChannelId, index: usize, dsp: DspId) -> Result<(), EngineError> {
        let mut mixer = self.mixer.lock();
        if !mixer.dsps.contains_key(&dsp) {
            return Err(EngineError::InvalidHandle);
        }
        let voice = mixer
            .voices
            .get_mut(&channel)
            .ok_or(EngineError::InvalidHandle)?;
        let at = index.min(voice.dsp_chain.len());
        voice.dsp_chain.insert(at, dsp);
        Ok(())
    }

    fn release_dsp(&mut self, dsp: DspId) -> Result<(), EngineError> {
        let mut mixer = self.mixer.lock();
        mixer.dsps.remove(&dsp).ok_or(EngineError::InvalidHandle)?;
        for voice in mixer.voices.values_mut() {
            voice.dsp_chain.retain(|d| *d != dsp);
        }
        Ok(())
    }

    fn suspend_mixer(&mut self) -> Result<(), EngineError> {
        self.mixer.lock().set_suspended(true);
        Ok(())
    }

    fn resume_mixer(&mut self) -> Result<(), EngineError> {
        self.mixer.lock().set_suspended(false);
        Ok(())
    }
}
