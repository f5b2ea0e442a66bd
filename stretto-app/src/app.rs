//! Front-end state and command dispatch

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use stretto_audio::{AudioBackend, Control, Player, PlayerError, Transport, UiEvent};
use stretto_input::Command;
use tracing::{info, warn};

/// Bytes read off disk for a pending load
pub struct LoadResult {
    pub path: PathBuf,
    pub bytes: std::io::Result<Vec<u8>>,
}

/// What the view shows; fed by [`UiEvent`]s and transport polling
#[derive(Debug, Default)]
pub struct App {
    pub tempo: String,
    pub pitch_correction: String,
    pub status: String,
    pub ready: bool,
    pub error: Option<String>,
    /// Transient feedback (unknown command, disabled control)
    pub message: Option<String>,
    pub transport: Option<Transport>,
    pub enabled: Vec<Control>,
    pub track: Option<PathBuf>,
    /// Path being read in the background
    pub pending: Option<PathBuf>,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Ready(ready) => self.ready = ready,
            UiEvent::Status(text) => self.status = text,
            UiEvent::Tempo(text) => self.tempo = text,
            UiEvent::PitchCorrection(text) => self.pitch_correction = text,
            UiEvent::Error(text) => self.error = Some(text),
        }
    }

    pub fn drain_events(&mut self, events: &Receiver<UiEvent>) {
        for event in events.try_iter() {
            self.apply_event(event);
        }
    }

    /// Re-read everything that is polled rather than signalled
    pub fn refresh<B: AudioBackend>(&mut self, player: &Player<B>) {
        self.transport = player.transport().ok();
        self.enabled = player.gate().enabled_controls();
    }

    /// Run one command against the player
    pub fn dispatch<B: AudioBackend>(
        &mut self,
        cmd: Command,
        player: &mut Player<B>,
        loads: &Sender<LoadResult>,
    ) {
        if let Some(control) = cmd.control() {
            if !player.gate().is_enabled(control) {
                self.message = Some(format!("{} is not available right now", control.label()));
                return;
            }
        }

        let result = match cmd {
            Command::TogglePlay => player.toggle_play_pause().map(|_| ()),
            Command::Seek { step, forward } => player.skip(step, forward).map(|_| ()),
            Command::NudgeTempo { step, faster } => {
                player.nudge_tempo(step, faster).map(|_| ())
            }
            Command::SetTempo(multiplier) => player.set_tempo(multiplier).map(|_| ()),
            Command::ResetTempo => player.reset_tempo().map(|_| ()),
            Command::TogglePitchCorrection => player.toggle_pitch_correction().map(|_| ()),
            Command::LoadTrack(path) => self.start_load(path, player, loads),
            Command::EnterCommandMode | Command::EnterNormalMode => {
                self.message = None;
                Ok(())
            }
            Command::ExecuteCommand(line) => {
                self.message = Some(format!("Unknown command: {}", line));
                Ok(())
            }
            Command::Quit => {
                self.should_quit = true;
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Command failed: {}", e);
            self.error = Some(e.to_string());
        }
    }

    fn start_load<B: AudioBackend>(
        &mut self,
        path: PathBuf,
        player: &mut Player<B>,
        loads: &Sender<LoadResult>,
    ) -> Result<(), PlayerError> {
        // Picking a file counts as a user gesture for the output device
        if let Err(e) = player.resume_context() {
            warn!("Could not resume audio output: {}", e);
        }
        player.begin_load()?;
        self.error = None;
        self.message = None;
        self.pending = Some(path.clone());
        info!("Loading {}", path.display());

        let loads = loads.clone();
        thread::spawn(move || {
            let bytes = fs::read(&path);
            let _ = loads.send(LoadResult { path, bytes });
        });
        Ok(())
    }

    /// Hand finished reads to the player; returns the path that became live
    pub fn complete_load<B: AudioBackend>(
        &mut self,
        result: LoadResult,
        player: &mut Player<B>,
    ) -> Option<PathBuf> {
        if self.pending.as_deref() != Some(result.path.as_path()) {
            warn!("Dropping stale read of {}", result.path.display());
            return None;
        }
        self.pending = None;

        match result.bytes {
            Ok(bytes) => match player.finish_load(&bytes) {
                Ok(()) => {
                    self.track = Some(result.path.clone());
                    Some(result.path)
                }
                Err(e) => {
                    self.track = None;
                    // The gate already reported a decode failure
                    if !matches!(e, PlayerError::Decode(_)) {
                        self.error = Some(e.to_string());
                    }
                    None
                }
            },
            Err(e) => {
                self.track = None;
                player.abort_load(&format!("Could not read {}: {}", display_name(&result.path), e));
                None
            }
        }
    }
}

/// File name for display, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `m:ss` for a millisecond position
pub fn format_time(ms: u32) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
