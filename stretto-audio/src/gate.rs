//! UI gate - control enablement and display signals
//!
//! The player reports readiness and display text through a channel of
//! [`UiEvent`]s; front ends render whatever arrives and ask the gate which
//! controls may be used.

use crossbeam_channel::{bounded, Receiver, Sender};

/// User-facing controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    FileInput,
    Play,
    PitchCorrection,
    Rewind,
    Forward,
    RewindLarge,
    ForwardLarge,
    Slower,
    Faster,
    SlowerLarge,
    FasterLarge,
    ResetTempo,
}

impl Control {
    /// Controls that need a loaded track
    pub const TRANSPORT: [Control; 11] = [
        Control::Play,
        Control::PitchCorrection,
        Control::Rewind,
        Control::Forward,
        Control::RewindLarge,
        Control::ForwardLarge,
        Control::Slower,
        Control::Faster,
        Control::SlowerLarge,
        Control::FasterLarge,
        Control::ResetTempo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Control::FileInput => "Open",
            Control::Play => "Play/Pause",
            Control::PitchCorrection => "Pitch Lock",
            Control::Rewind => "-5s",
            Control::Forward => "+5s",
            Control::RewindLarge => "-25s",
            Control::ForwardLarge => "+25s",
            Control::Slower => "Slower",
            Control::Faster => "Faster",
            Control::SlowerLarge => "Much Slower",
            Control::FasterLarge => "Much Faster",
            Control::ResetTempo => "Reset",
        }
    }
}

/// Signals emitted towards the front end
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Processing finished (`true`) or started (`false`)
    Ready(bool),
    /// Status line text
    Status(String),
    /// Formatted tempo multiplier, e.g. `"1.25x"`
    Tempo(String),
    /// Pitch correction label, `"On"` or `"Off"`
    PitchCorrection(String),
    /// Something failed; the message is for display
    Error(String),
}

/// Status text while idle and ready
pub const STATUS_READY: &str = "Ready to Play.";
/// Status text while processing
pub const STATUS_PROCESSING: &str = "Processing...";
/// Status text once a file has been picked
pub const STATUS_LOADING: &str = "Loading...";

/// Tracks what the user may touch and forwards display signals
pub struct UiGate {
    events: Sender<UiEvent>,
    engine_up: bool,
    ready: bool,
    session_active: bool,
}

impl UiGate {
    /// Create the event channel
    /// 256 slots absorb a burst of key repeats between frames
    pub fn create_channel() -> (Sender<UiEvent>, Receiver<UiEvent>) {
        bounded(256)
    }

    pub fn new(events: Sender<UiEvent>) -> Self {
        Self {
            events,
            engine_up: false,
            ready: false,
            session_active: false,
        }
    }

    /// Engine is up; files may be opened from now on
    pub fn enable_file_input(&mut self) {
        self.engine_up = true;
    }

    /// Flip readiness and announce it
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
        self.emit(UiEvent::Ready(ready));
        self.emit(UiEvent::Status(
            if ready { STATUS_READY } else { STATUS_PROCESSING }.to_string(),
        ));
    }

    pub fn set_session_active(&mut self, active: bool) {
        self.session_active = active;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        match control {
            Control::FileInput => self.engine_up,
            _ => self.engine_up && self.ready && self.session_active,
        }
    }

    pub fn enabled_controls(&self) -> Vec<Control> {
        std::iter::once(Control::FileInput)
            .chain(Control::TRANSPORT)
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    pub fn status(&self, text: impl Into<String>) {
        self.emit(UiEvent::Status(text.into()));
    }

    pub fn tempo(&self, text: impl Into<String>) {
        self.emit(UiEvent::Tempo(text.into()));
    }

    pub fn pitch_correction(&self, text: impl Into<String>) {
        self.emit(UiEvent::PitchCorrection(text.into()));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.emit(UiEvent::Error(text.into()));
    }

    fn emit(&self, event: UiEvent) {
        // A full or closed channel only loses display updates
        let _ = self.events.try_send(event);
    }
}
