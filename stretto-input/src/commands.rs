//! Command definitions for Stretto

use std::path::PathBuf;

use stretto_audio::{Control, Step};

/// Commands that can be dispatched from input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Transport
    TogglePlay,
    Seek { step: Step, forward: bool },

    // Tempo
    NudgeTempo { step: Step, faster: bool },
    SetTempo(f32),
    ResetTempo,
    TogglePitchCorrection,

    // Track
    LoadTrack(PathBuf),

    // Modes
    EnterCommandMode,
    EnterNormalMode,
    /// Command line text that did not parse
    ExecuteCommand(String),

    Quit,
}

impl Command {
    /// The on-screen control this command stands in for, if gated
    pub fn control(&self) -> Option<Control> {
        match self {
            Command::TogglePlay => Some(Control::Play),
            Command::Seek { step, forward } => Some(match (step, forward) {
                (Step::Small, false) => Control::Rewind,
                (Step::Small, true) => Control::Forward,
                (Step::Large, false) => Control::RewindLarge,
                (Step::Large, true) => Control::ForwardLarge,
            }),
            Command::NudgeTempo { step, faster } => Some(match (step, faster) {
                (Step::Small, false) => Control::Slower,
                (Step::Small, true) => Control::Faster,
                (Step::Large, false) => Control::SlowerLarge,
                (Step::Large, true) => Control::FasterLarge,
            }),
            // Typed tempo goes through the same gate as the buttons
            Command::SetTempo(_) => Some(Control::Faster),
            Command::ResetTempo => Some(Control::ResetTempo),
            Command::TogglePitchCorrection => Some(Control::PitchCorrection),
            Command::LoadTrack(_) => Some(Control::FileInput),
            Command::EnterCommandMode
            | Command::EnterNormalMode
            | Command::ExecuteCommand(_)
            | Command::Quit => None,
        }
    }
}
