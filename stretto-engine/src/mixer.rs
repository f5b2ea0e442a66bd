//! Mixer - voices, DSP units and the render loop shared with the audio thread

use std::collections::HashMap;
use std::sync::Arc;

use stretto_audio::{ChannelId, DspId, DspType, SoundId, SoundMode};

use crate::decode::DecodedSound;
use crate::pitch::PitchShifter;

/// A DSP unit living in the mixer
pub enum DspUnit {
    PitchShift(PitchShifter),
}

impl DspUnit {
    pub fn new(kind: DspType) -> Self {
        match kind {
            DspType::PitchShift => DspUnit::PitchShift(PitchShifter::new()),
        }
    }

    #[inline]
    fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        match self {
            DspUnit::PitchShift(shifter) => shifter.process(left, right),
        }
    }
}

/// A decoded sound and the mode it was created with
pub struct LoadedSound {
    pub decoded: DecodedSound,
    pub mode: SoundMode,
}

/// One playing instance of a sound
pub struct Voice {
    pub sound: SoundId,
    samples: Arc<Vec<f32>>,
    /// Sound's native sample rate
    pub native_rate: u32,
    /// Playback position in source frames
    pub position: f64,
    /// Output frequency in Hz; equals `native_rate` at normal speed
    pub frequency: f32,
    pub volume: f32,
    pub paused: bool,
    pub looping: bool,
    /// Reached the end of a non-looping sound
    pub finished: bool,
    pub dsp_chain: Vec<DspId>,
}

impl Voice {
    pub fn new(sound: SoundId, decoded: &DecodedSound, looping: bool, paused: bool) -> Self {
        Self {
            sound,
            samples: decoded.samples.clone(),
            native_rate: decoded.sample_rate,
            position: 0.0,
            frequency: decoded.sample_rate as f32,
            volume: 1.0,
            paused,
            looping,
            finished: false,
            dsp_chain: Vec::new(),
        }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Position rounded to the nearest millisecond
    pub fn position_ms(&self) -> u32 {
        (self.position * 1000.0 / self.native_rate.max(1) as f64).round() as u32
    }

    pub fn set_position_frames(&mut self, frames: u32) {
        self.position = (frames as f64).min(self.frames() as f64);
        self.finished = false;
    }

    /// Interpolated stereo frame at the current position
    #[inline]
    fn frame(&self) -> (f32, f32) {
        let frames = self.frames();
        let idx = self.position as usize;
        if idx >= frames {
            return (0.0, 0.0);
        }
        let next = if idx + 1 < frames {
            idx + 1
        } else if self.looping {
            0
        } else {
            idx
        };
        let frac = self.position.fract() as f32;
        let (l0, r0) = (self.samples[idx * 2], self.samples[idx * 2 + 1]);
        let (l1, r1) = (self.samples[next * 2], self.samples[next * 2 + 1]);
        (l0 + frac * (l1 - l0), r0 + frac * (r1 - r0))
    }

    #[inline]
    fn advance(&mut self, step: f64) {
        let frames = self.frames() as f64;
        self.position += step;
        if self.position >= frames {
            if self.looping && frames > 0.0 {
                self.position %= frames;
            } else {
                self.position = frames;
                self.finished = true;
            }
        }
    }
}

/// Everything the render callback touches
pub struct Mixer {
    output_rate: u32,
    suspended: bool,
    pub(crate) sounds: HashMap<SoundId, LoadedSound>,
    pub(crate) voices: HashMap<ChannelId, Voice>,
    pub(crate) dsps: HashMap<DspId, DspUnit>,
}

impl Mixer {
    pub fn new(output_rate: u32) -> Self {
        Self {
            output_rate: output_rate.max(1),
            suspended: false,
            sounds: HashMap::new(),
            voices: HashMap::new(),
            dsps: HashMap::new(),
        }
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    /// Mix all voices into `output` (interleaved, `channels` wide)
    pub fn render(&mut self, output: &mut [f32], channels: usize) {
        output.fill(0.0);
        if self.suspended || channels == 0 {
            return;
        }

        let output_rate = self.output_rate as f64;
        let dsps = &mut self.dsps;

        for voice in self.voices.values_mut() {
            if voice.paused || voice.finished {
                continue;
            }
            let step = voice.frequency as f64 / output_rate;

            for frame in output.chunks_mut(channels) {
                let (mut l, mut r) = voice.frame();
                for id in &voice.dsp_chain {
                    if let Some(unit) = dsps.get_mut(id) {
                        (l, r) = unit.process(l, r);
                    }
                }
                l *= voice.volume;
                r *= voice.volume;

                if channels == 1 {
                    frame[0] += (l + r) * 0.5;
                } else {
                    frame[0] += l;
                    frame[1] += r;
                }

                voice.advance(step);
                if voice.finished {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp(frames: usize, rate: u32) -> DecodedSound {
        let samples = (0..frames)
            .flat_map(|i| {
                let v = i as f32 / frames as f32;
                [v, -v]
            })
            .collect();
        DecodedSound {
            samples: Arc::new(samples),
            sample_rate: rate,
        }
    }

    fn mixer_with_voice(looping: bool) -> Mixer {
        let mut mixer = Mixer::new(1000);
        let sound = ramp(1000, 1000);
        mixer
            .voices
            .insert(ChannelId(1), Voice::new(SoundId(1), &sound, looping, false));
        mixer
    }

    #[test]
    fn test_native_frequency_advances_one_frame() {
        let mut mixer = mixer_with_voice(true);
        let mut out = vec![0.0; 200];
        mixer.render(&mut out, 2);
        assert_abs_diff_eq!(mixer.voices[&ChannelId(1)].position, 100.0);
        assert_abs_diff_eq!(out[2], 0.001);
        assert_abs_diff_eq!(out[3], -0.001);
    }

    #[test]
    fn test_frequency_scales_playback_rate() {
        let mut mixer = mixer_with_voice(true);
        mixer.voices.get_mut(&ChannelId(1)).unwrap().frequency = 1250.0;
        let mut out = vec![0.0; 200];
        mixer.render(&mut out, 2);
        assert_abs_diff_eq!(mixer.voices[&ChannelId(1)].position, 125.0, epsilon = 1e-9);
    }

    #[test]
    fn test_looping_wraps() {
        let mut mixer = mixer_with_voice(true);
        let mut out = vec![0.0; 2400];
        mixer.render(&mut out, 2);
        let voice = &mixer.voices[&ChannelId(1)];
        assert!(!voice.finished);
        assert_abs_diff_eq!(voice.position, 200.0);
    }

    #[test]
    fn test_one_shot_finishes() {
        let mut mixer = mixer_with_voice(false);
        let mut out = vec![0.0; 2400];
        mixer.render(&mut out, 2);
        let voice = &mixer.voices[&ChannelId(1)];
        assert!(voice.finished);
        assert_eq!(voice.position_ms(), 1000);
        assert_eq!(out[2398], 0.0);
    }

    #[test]
    fn test_paused_and_suspended_are_silent() {
        let mut mixer = mixer_with_voice(true);
        mixer.voices.get_mut(&ChannelId(1)).unwrap().position = 500.0;
        mixer.voices.get_mut(&ChannelId(1)).unwrap().paused = true;
        let mut out = vec![1.0; 64];
        mixer.render(&mut out, 2);
        assert!(out.iter().all(|s| *s == 0.0));

        mixer.voices.get_mut(&ChannelId(1)).unwrap().paused = false;
        mixer.set_suspended(true);
        mixer.render(&mut out, 2);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_volume_and_mono_downmix() {
        let mut mixer = mixer_with_voice(true);
        let voice = mixer.voices.get_mut(&ChannelId(1)).unwrap();
        voice.position = 500.0;
        voice.volume = 0.5;
        let mut out = vec![0.0; 4];
        mixer.render(&mut out, 2);
        assert_abs_diff_eq!(out[0], 0.25);
        assert_abs_diff_eq!(out[1], -0.25);

        let mut mono = vec![0.0; 4];
        mixer.render(&mut mono, 1);
        assert_abs_diff_eq!(mono[0], 0.0);
    }
}
