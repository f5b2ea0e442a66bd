//! Tempo controller - maps a tempo multiplier onto channel frequency and pitch correction
//!
//! Speeding a channel up by raising its output frequency also raises its
//! pitch. With pitch correction on, a pitch-shift unit compensates by
//! `1 / multiplier`, so only the tempo changes.

/// Allowed multiplier range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoLimits {
    min: f32,
    max: f32,
}

impl TempoLimits {
    /// Create limits; the bounds are reordered if given backwards
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }
}

impl Default for TempoLimits {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

/// Whether pitch follows the tempo or is held constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitchMode {
    /// The pitch unit compensates the frequency change
    #[default]
    PitchCorrected,
    /// The pitch unit is neutral; faster playback sounds higher
    PitchFollowsTempo,
}

impl PitchMode {
    pub fn toggled(self) -> Self {
        match self {
            PitchMode::PitchCorrected => PitchMode::PitchFollowsTempo,
            PitchMode::PitchFollowsTempo => PitchMode::PitchCorrected,
        }
    }

    /// Pitch-shift parameter for the given multiplier
    pub fn pitch_for(self, multiplier: f32) -> f32 {
        match self {
            PitchMode::PitchCorrected => 1.0 / multiplier,
            PitchMode::PitchFollowsTempo => 1.0,
        }
    }

    /// Status label shown next to the pitch correction control
    pub fn label(self) -> &'static str {
        match self {
            PitchMode::PitchCorrected => "On",
            PitchMode::PitchFollowsTempo => "Off",
        }
    }
}

/// Increment size for tempo nudges and seeks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Small,
    Large,
}

/// Engine parameters derived from the tempo state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoParams {
    pub multiplier: f32,
    /// Output frequency for the channel in Hz
    pub frequency: f32,
    /// Value for the pitch-shift unit's pitch parameter
    pub pitch: f32,
}

/// Round to two decimal places, halves going up
pub fn round_to_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Display text for a multiplier, e.g. `"1.25x"`
pub fn format_multiplier(multiplier: f32) -> String {
    format!("{:.2}x", multiplier)
}

/// Tempo state and the policy applied to it
#[derive(Debug, Clone)]
pub struct TempoController {
    multiplier: f32,
    limits: TempoLimits,
    mode: PitchMode,
    small_step: f32,
    large_step: f32,
}

impl Default for TempoController {
    fn default() -> Self {
        Self::new(TempoLimits::default())
    }
}

impl TempoController {
    /// Small nudge size
    pub const SMALL_STEP: f32 = 0.05;
    /// Large nudge size
    pub const LARGE_STEP: f32 = 0.25;

    pub fn new(limits: TempoLimits) -> Self {
        Self {
            multiplier: 1.0,
            limits,
            mode: PitchMode::default(),
            small_step: Self::SMALL_STEP,
            large_step: Self::LARGE_STEP,
        }
    }

    /// Override the nudge sizes
    pub fn with_steps(mut self, small: f32, large: f32) -> Self {
        self.small_step = small.abs();
        self.large_step = large.abs();
        self
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn mode(&self) -> PitchMode {
        self.mode
    }

    /// Clamp, round and store a requested multiplier
    ///
    /// Returns the stored value. A NaN request leaves the state as is.
    pub fn set_tempo(&mut self, requested: f32) -> f32 {
        self.multiplier = self.resolve(requested);
        self.multiplier
    }

    /// The multiplier `set_tempo` would store, without storing it
    pub fn resolve(&self, requested: f32) -> f32 {
        if requested.is_nan() {
            return self.multiplier;
        }
        round_to_hundredths(requested.clamp(self.limits.min, self.limits.max))
    }

    /// Target multiplier for a nudge from the current value
    pub fn nudged(&self, step: Step, faster: bool) -> f32 {
        let size = match step {
            Step::Small => self.small_step,
            Step::Large => self.large_step,
        };
        if faster {
            self.multiplier + size
        } else {
            self.multiplier - size
        }
    }

    /// Flip between corrected and natural pitch; the multiplier is untouched
    pub fn toggle_pitch_mode(&mut self) -> PitchMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Engine parameters for the current state against a channel's base frequency
    pub fn params(&self, base_frequency: f32) -> TempoParams {
        self.params_for(self.multiplier, base_frequency)
    }

    /// Engine parameters for `multiplier` under the current pitch mode
    pub fn params_for(&self, multiplier: f32, base_frequency: f32) -> TempoParams {
        TempoParams {
            multiplier,
            frequency: base_frequency * multiplier,
            pitch: self.mode.pitch_for(multiplier),
        }
    }

    /// `set_tempo` followed by `params`
    pub fn apply(&mut self, requested: f32, base_frequency: f32) -> TempoParams {
        self.set_tempo(requested);
        self.params(base_frequency)
    }

    pub fn display(&self) -> String {
        format_multiplier(self.multiplier)
    }
}
