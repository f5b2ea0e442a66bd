//! Recording engine double for unit tests

use std::collections::HashMap;

use crate::backend::{
    AudioBackend, ChannelId, DspId, DspType, EngineError, InitFlags, SoundId, SoundMode, TimeUnit,
};
use crate::vfs::{Removal, VfsError, VirtualFs};

/// Create/release tallies
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub sounds_created: u32,
    pub sounds_released: u32,
    pub channels_started: u32,
    pub channels_stopped: u32,
    pub dsps_created: u32,
    pub dsps_released: u32,
    pub dsps_attached: u32,
    pub unlinks: u32,
    pub mixer_resumes: u32,
}

#[derive(Debug, Clone)]
pub struct FakeChannel {
    pub sound: SoundId,
    pub frequency: f32,
    pub position_ms: u32,
    pub paused: bool,
    pub volume: f32,
    pub dsps: Vec<DspId>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDsp {
    pub float_params: HashMap<u32, f32>,
    pub int_params: HashMap<u32, i32>,
}

/// In-memory engine that records every call
///
/// Staged files whose content is empty fail to decode.
#[derive(Debug)]
pub struct FakeBackend {
    pub initialized: bool,
    pub fail_init: bool,
    pub fail_dsp: bool,
    pub fail_set_frequency: bool,
    pub fail_attach: bool,
    pub native_frequency: f32,
    pub length_ms: u32,
    pub files: HashMap<String, Vec<u8>>,
    pub sounds: HashMap<SoundId, SoundMode>,
    pub channels: HashMap<ChannelId, FakeChannel>,
    pub dsps: HashMap<DspId, FakeDsp>,
    pub counts: CallCounts,
    /// Ordered log of lifecycle calls
    pub log: Vec<String>,
    next_id: u32,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            initialized: false,
            fail_init: false,
            fail_dsp: false,
            fail_set_frequency: false,
            fail_attach: false,
            native_frequency: 44100.0,
            length_ms: 10_000,
            files: HashMap::new(),
            sounds: HashMap::new(),
            channels: HashMap::new(),
            dsps: HashMap::new(),
            counts: CallCounts::default(),
            log: Vec::new(),
            next_id: 1,
        }
    }

    pub fn live_handles(&self) -> usize {
        self.sounds.len() + self.channels.len() + self.dsps.len()
    }

    pub fn channel(&self, id: ChannelId) -> &FakeChannel {
        &self.channels[&id]
    }

    pub fn pitch_param(&self, id: DspId) -> Option<f32> {
        self.dsps[&id]
            .float_params
            .get(&crate::backend::pitch_shift::PITCH)
            .copied()
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn channel_mut(&mut self, id: ChannelId) -> Result<&mut FakeChannel, EngineError> {
        self.channels.get_mut(&id).ok_or(EngineError::InvalidHandle)
    }

    fn channel_ref(&self, id: ChannelId) -> Result<&FakeChannel, EngineError> {
        self.channels.get(&id).ok_or(EngineError::InvalidHandle)
    }
}

impl VirtualFs for FakeBackend {
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), VfsError> {
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn unlink(&mut self, path: &str) -> Result<Removal, VfsError> {
        self.counts.unlinks += 1;
        Ok(match self.files.remove(path) {
            Some(_) => Removal::Removed,
            None => Removal::NotFound,
        })
    }
}

impl AudioBackend for FakeBackend {
    fn init(&mut self, _max_channels: u32, _flags: InitFlags) -> Result<(), EngineError> {
        if self.fail_init {
            return Err(EngineError::Init("no output device".into()));
        }
        self.initialized = true;
        Ok(())
    }

    fn create_sound(&mut self, path: &str, mode: SoundMode) -> Result<SoundId, EngineError> {
        let bytes = self
            .files
            .get(path)
            .ok_or_else(|| EngineError::FileNotFound(path.to_string()))?;
        if bytes.is_empty() {
            return Err(EngineError::Format("empty file".into()));
        }
        let id = SoundId(self.next());
        self.sounds.insert(id, mode);
        self.counts.sounds_created += 1;
        self.log.push(format!("create_sound {}", id.0));
        Ok(id)
    }

    fn release_sound(&mut self, sound: SoundId) -> Result<(), EngineError> {
        self.sounds
            .remove(&sound)
            .ok_or(EngineError::InvalidHandle)?;
        self.counts.sounds_released += 1;
        self.log.push(format!("release_sound {}", sound.0));
        Ok(())
    }

    fn play_sound(&mut self, sound: SoundId, paused: bool) -> Result<ChannelId, EngineError> {
        if !self.sounds.contains_key(&sound) {
            return Err(EngineError::InvalidHandle);
        }
        let id = ChannelId(self.next());
        self.channels.insert(
            id,
            FakeChannel {
                sound,
                frequency: self.native_frequency,
                position_ms: 0,
                paused,
                volume: 1.0,
                dsps: Vec::new(),
            },
        );
        self.counts.channels_started += 1;
        self.log.push(format!("play_sound {}", id.0));
        Ok(id)
    }

    fn sound_length(&self, sound: SoundId, unit: TimeUnit) -> Result<u32, EngineError> {
        if !self.sounds.contains_key(&sound) {
            return Err(EngineError::InvalidHandle);
        }
        Ok(match unit {
            TimeUnit::Ms => self.length_ms,
            TimeUnit::Pcm => (self.length_ms as f32 / 1000.0 * self.native_frequency) as u32,
        })
    }

    fn frequency(&self, channel: ChannelId) -> Result<f32, EngineError> {
        Ok(self.channel_ref(channel)?.frequency)
    }

    fn set_frequency(&mut self, channel: ChannelId, hz: f32) -> Result<(), EngineError> {
        if self.fail_set_frequency {
            return Err(EngineError::InvalidHandle);
        }
        self.channel_mut(channel)?.frequency = hz;
        Ok(())
    }

    fn position(&self, channel: ChannelId, unit: TimeUnit) -> Result<u32, EngineError> {
        let ms = self.channel_ref(channel)?.position_ms;
        Ok(match unit {
            TimeUnit::Ms => ms,
            TimeUnit::Pcm => (ms as f32 / 1000.0 * self.native_frequency) as u32,
        })
    }

    fn set_position(
        &mut self,
        channel: ChannelId,
        position: u32,
        unit: TimeUnit,
    ) -> Result<(), EngineError> {
        let native = self.native_frequency;
        let ms = match unit {
            TimeUnit::Ms => position,
            TimeUnit::Pcm => (position as f32 / native * 1000.0) as u32,
        };
        self.channel_mut(channel)?.position_ms = ms;
        Ok(())
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) -> Result<(), EngineError> {
        self.channel_mut(channel)?.volume = volume;
        Ok(())
    }

    fn paused(&self, channel: ChannelId) -> Result<bool, EngineError> {
        Ok(self.channel_ref(channel)?.paused)
    }

    fn set_paused(&mut self, channel: ChannelId, paused: bool) -> Result<(), EngineError> {
        self.channel_mut(channel)?.paused = paused;
        Ok(())
    }

    fn stop(&mut self, channel: ChannelId) -> Result<(), EngineError> {
        self.channels
            .remove(&channel)
            .ok_or(EngineError::InvalidHandle)?;
        self.counts.channels_stopped += 1;
        self.log.push(format!("stop {}", channel.0));
        Ok(())
    }

    fn create_dsp(&mut self, kind: DspType) -> Result<DspId, EngineError> {
        if self.fail_dsp {
            return Err(EngineError::UnsupportedDsp(kind));
        }
        let id = DspId(self.next());
        self.dsps.insert(id, FakeDsp::default());
        self.counts.dsps_created += 1;
        self.log.push(format!("create_dsp {}", id.0));
        Ok(id)
    }

    fn set_dsp_parameter_int(
        &mut self,
        dsp: DspId,
        index: u32,
        value: i32,
    ) -> Result<(), EngineError> {
        let unit = self.dsps.get_mut(&dsp).ok_or(EngineError::InvalidHandle)?;
        unit.int_params.insert(index, value);
        Ok(())
    }

    fn set_dsp_parameter_float(
        &mut self,
        dsp: DspId,
        index: u32,
        value: f32,
    ) -> Result<(), EngineError> {
        let unit = self.dsps.get_mut(&dsp).ok_or(EngineError::InvalidHandle)?;
        unit.float_params.insert(index, value);
        Ok(())
    }

    fn add_dsp(&mut self, channel: ChannelId, index: usize, dsp: DspId) -> Result<(), EngineError> {
        if self.fail_attach || !self.dsps.contains_key(&dsp) {
            return Err(EngineError::InvalidHandle);
        }
        let chain = &mut self.channel_mut(channel)?.dsps;
        let at = index.min(chain.len());
        chain.insert(at, dsp);
        self.counts.dsps_attached += 1;
        Ok(())
    }

    fn release_dsp(&mut self, dsp: DspId) -> Result<(), EngineError> {
        self.dsps.remove(&dsp).ok_or(EngineError::InvalidHandle)?;
        for channel in self.channels.values_mut() {
            channel.dsps.retain(|d| *d != dsp);
        }
        self.counts.dsps_released += 1;
        self.log.push(format!("release_dsp {}", dsp.0));
        Ok(())
    }

    fn suspend_mixer(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn resume_mixer(&mut self) -> Result<(), EngineError> {
        self.counts.mixer_resumes += 1;
        Ok(())
    }
}
