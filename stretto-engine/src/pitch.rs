//! Pitch shifter - dual-tap delay line with crossfaded read heads
//!
//! Two read heads sweep a delay line at a rate set by the pitch ratio, half
//! a window apart. Each head fades out as it wraps, so the jumps are hidden
//! under the other head. Duration is unchanged, only the pitch moves.

/// Pitch shifter unit
pub struct PitchShifter {
    buffer_l: Box<[f32]>,
    buffer_r: Box<[f32]>,
    write_pos: usize,
    /// Head position within the window (0.0 - 1.0)
    phase: f32,
    /// Window length in samples
    window: usize,
    /// Pitch ratio (1.0 = unchanged)
    ratio: f32,
}

impl PitchShifter {
    pub const MIN_WINDOW: usize = 256;
    pub const MAX_WINDOW: usize = 8192;
    pub const MIN_RATIO: f32 = 0.25;
    pub const MAX_RATIO: f32 = 4.0;

    /// Buffer holds the longest window plus interpolation guard
    const BUFFER_LEN: usize = Self::MAX_WINDOW + 4;

    pub fn new() -> Self {
        Self {
            buffer_l: vec![0.0; Self::BUFFER_LEN].into_boxed_slice(),
            buffer_r: vec![0.0; Self::BUFFER_LEN].into_boxed_slice(),
            write_pos: 0,
            phase: 0.0,
            window: 4096,
            ratio: 1.0,
        }
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.clamp(Self::MIN_RATIO, Self::MAX_RATIO);
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Set window length in samples (256-8192); clears the delay line
    pub fn set_window(&mut self, window: usize) {
        let window = window.clamp(Self::MIN_WINDOW, Self::MAX_WINDOW);
        if window != self.window {
            self.window = window;
            self.reset();
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn reset(&mut self) {
        self.buffer_l.fill(0.0);
        self.buffer_r.fill(0.0);
        self.write_pos = 0;
        self.phase = 0.0;
    }

    /// Linear-interpolated read `delay` samples behind the write head
    #[inline]
    fn read(buffer: &[f32], write_pos: usize, delay: f32) -> f32 {
        let len = buffer.len();
        let pos = write_pos as f32 - delay;
        let pos = if pos < 0.0 { pos + len as f32 } else { pos };
        let i0 = (pos as usize) % len;
        let i1 = (i0 + 1) % len;
        let frac = pos.fract();
        buffer[i0] + frac * (buffer[i1] - buffer[i0])
    }

    /// Process one stereo frame
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.buffer_l[self.write_pos] = left;
        self.buffer_r[self.write_pos] = right;

        // Heads move against the write head at (1 - ratio) windows per window
        self.phase += (1.0 - self.ratio) / self.window as f32;
        self.phase -= self.phase.floor();

        let window = self.window as f32;
        let mut out_l = 0.0;
        let mut out_r = 0.0;
        for head in [self.phase, (self.phase + 0.5).fract()] {
            let delay = head * window;
            // Triangular gains of two heads half a window apart sum to 1
            let gain = 1.0 - (2.0 * head - 1.0).abs();
            out_l += gain * Self::read(&self.buffer_l, self.write_pos, delay);
            out_r += gain * Self::read(&self.buffer_r, self.write_pos, delay);
        }

        self.write_pos = (self.write_pos + 1) % self.buffer_l.len();
        (out_l, out_r)
    }
}

impl Default for PitchShifter {
    fn default() -> Self {
        Self::new()
    }
}
