//! Player - owns the engine, the live session and the tempo state
//!
//! Every user action enters through here. A track load runs in two phases so
//! the file read in between can happen off the control thread:
//!
//! ```text
//! Empty/Active/Failed --begin_load--> Loading --finish_load--> Active | Failed
//! ```
//!
//! While `Loading`, a second `begin_load` is rejected.

use crossbeam_channel::Sender;
use tracing::{debug, error, info, warn};

use crate::backend::{pitch_shift, AudioBackend, ChannelId, DspId, DspType, EngineError, InitFlags, SoundId, TimeUnit};
use crate::error::PlayerError;
use crate::gate::{UiEvent, UiGate, STATUS_LOADING};
use crate::session::{Session, SessionState};
use crate::settings::PlayerSettings;
use crate::tempo::{format_multiplier, PitchMode, Step, TempoController, TempoParams};

/// Transport position snapshot for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transport {
    pub position_ms: u32,
    pub length_ms: u32,
    pub paused: bool,
}

/// Clamp `position + delta` into `[0, length]`
pub fn clamp_position(position_ms: u32, delta_ms: i64, length_ms: u32) -> u32 {
    (position_ms as i64)
        .saturating_add(delta_ms)
        .clamp(0, length_ms as i64) as u32
}

/// Playback controller for one track at a time
pub struct Player<B: AudioBackend> {
    backend: B,
    settings: PlayerSettings,
    tempo: TempoController,
    gate: UiGate,
    state: SessionState,
    session: Option<Session>,
}

impl<B: AudioBackend> Player<B> {
    /// Initialize the engine and announce the initial display state
    pub fn new(
        mut backend: B,
        settings: PlayerSettings,
        events: Sender<UiEvent>,
    ) -> Result<Self, PlayerError> {
        if let Err(e) = backend.init(settings.max_channels, InitFlags::Normal) {
            error!("Audio engine failed to start: {}", e);
            return Err(PlayerError::EngineInit(e));
        }

        let mut gate = UiGate::new(events);
        gate.enable_file_input();
        let tempo = settings.tempo_controller();
        gate.tempo(tempo.display());
        gate.pitch_correction(tempo.mode().label());
        gate.status("Select a track to play.");

        info!("Audio engine initialized ({} channels)", settings.max_channels);

        Ok(Self {
            backend,
            settings,
            tempo,
            gate,
            state: SessionState::Empty,
            session: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn tempo(&self) -> &TempoController {
        &self.tempo
    }

    pub fn gate(&self) -> &UiGate {
        &self.gate
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Kick the engine's mixer back to life after a suspend
    pub fn resume_context(&mut self) -> Result<(), PlayerError> {
        self.backend.suspend_mixer()?;
        self.backend.resume_mixer()?;
        Ok(())
    }

    /// Decode `bytes` and make them the live track
    pub fn load_track(&mut self, bytes: &[u8]) -> Result<(), PlayerError> {
        self.begin_load()?;
        self.finish_load(bytes)
    }

    /// Drop the current track and enter `Loading`
    pub fn begin_load(&mut self) -> Result<(), PlayerError> {
        if self.state == SessionState::Loading {
            warn!("Rejected load request: another track is still loading");
            return Err(PlayerError::LoadInProgress);
        }

        self.teardown();
        self.state = SessionState::Loading;
        self.gate.set_ready(false);
        self.gate.status(STATUS_LOADING);
        Ok(())
    }

    /// Build a session from the bytes read since `begin_load`
    ///
    /// Readiness is signalled whether or not decoding worked, so another
    /// file can be picked; transport controls stay disabled on failure.
    pub fn finish_load(&mut self, bytes: &[u8]) -> Result<(), PlayerError> {
        if self.state != SessionState::Loading {
            return Err(PlayerError::NotLoading);
        }

        let result = self.open_session(bytes);
        match result {
            Ok(session) => {
                info!(
                    "Track loaded ({} bytes, base frequency {} Hz, pitch unit: {})",
                    bytes.len(),
                    session.base_frequency(),
                    session.has_pitch_unit()
                );
                self.session = Some(session);
                self.state = SessionState::Active;
                self.gate.set_session_active(true);
                self.gate.pitch_correction(self.tempo.mode().label());
                let applied = self.apply_current_tempo();
                self.gate.set_ready(true);
                applied.map(|_| ())
            }
            Err(e) => {
                error!("Failed to load track: {}", e);
                self.state = SessionState::Failed;
                self.gate.set_ready(true);
                self.gate.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Give up on a load whose bytes never arrived (e.g. unreadable file)
    pub fn abort_load(&mut self, reason: &str) {
        if self.state != SessionState::Loading {
            return;
        }
        warn!("Load aborted: {}", reason);
        self.state = SessionState::Failed;
        self.gate.set_ready(true);
        self.gate.error(reason);
    }

    fn open_session(&mut self, bytes: &[u8]) -> Result<Session, PlayerError> {
        let path = self.settings.track_path.clone();
        let sound = self
            .backend
            .create_sound_from_bytes(&path, bytes, self.settings.sound_mode)
            .map_err(PlayerError::Decode)?;

        let (channel, base_frequency) = match self.start_channel(sound) {
            Ok(started) => started,
            Err(e) => {
                if let Err(release) = self.backend.release_sound(sound) {
                    warn!("Failed to release sound after aborted load: {}", release);
                }
                return Err(PlayerError::Decode(e));
            }
        };

        let pitch_unit = match self.attach_pitch_unit(channel) {
            Ok(dsp) => Some(dsp),
            Err(e) => {
                let e = PlayerError::DspCreation(e);
                warn!("{}; tempo changes will shift pitch", e);
                self.gate.error(e.to_string());
                None
            }
        };

        Ok(Session::new(sound, channel, pitch_unit, base_frequency))
    }

    fn start_channel(&mut self, sound: SoundId) -> Result<(ChannelId, f32), EngineError> {
        let channel = self.backend.play_sound(sound, !self.settings.autoplay)?;
        let configured = self
            .backend
            .set_volume(channel, self.settings.volume)
            .and_then(|_| self.backend.frequency(channel));
        match configured {
            Ok(base_frequency) => Ok((channel, base_frequency)),
            Err(e) => {
                if let Err(stop) = self.backend.stop(channel) {
                    warn!("Failed to stop channel after aborted load: {}", stop);
                }
                Err(e)
            }
        }
    }

    fn attach_pitch_unit(&mut self, channel: ChannelId) -> Result<DspId, EngineError> {
        let dsp = self.backend.create_dsp(DspType::PitchShift)?;
        let attached = self
            .backend
            .set_dsp_parameter_int(dsp, pitch_shift::FFT_SIZE, self.settings.pitch_window)
            .and_then(|_| self.backend.add_dsp(channel, 0, dsp));
        if let Err(e) = attached {
            if let Err(release) = self.backend.release_dsp(dsp) {
                warn!("Failed to release pitch unit after failed attach: {}", release);
            }
            return Err(e);
        }
        Ok(dsp)
    }

    /// Release the live session, if any
    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.release(&mut self.backend) {
                warn!("Error while releasing previous track: {}", e);
            }
        }
        self.state = SessionState::Empty;
        self.gate.set_session_active(false);
    }

    /// Release everything; the player is back to `Empty`
    pub fn shutdown(&mut self) {
        if self.state != SessionState::Empty {
            info!("Releasing track on shutdown");
        }
        self.teardown();
    }

    fn active(&self) -> Result<&Session, PlayerError> {
        self.session.as_ref().ok_or(PlayerError::NoActiveSession)
    }

    /// Set the tempo multiplier; returns the stored (clamped, rounded) value
    ///
    /// The multiplier is only stored once the engine has taken the new
    /// parameters, so a failed call leaves the previous tempo in place.
    pub fn set_tempo(&mut self, requested: f32) -> Result<f32, PlayerError> {
        let session = self.session.as_ref().ok_or(PlayerError::NoActiveSession)?;
        let multiplier = self.tempo.resolve(requested);
        let params = self.tempo.params_for(multiplier, session.base_frequency());
        let channel = session.channel();
        let pitch_unit = session.pitch_unit();
        self.push_params(channel, pitch_unit, params)?;
        Ok(self.tempo.set_tempo(multiplier))
    }

    /// Move the multiplier by an arbitrary amount
    pub fn adjust_tempo(&mut self, delta: f32) -> Result<f32, PlayerError> {
        self.set_tempo(self.tempo.multiplier() + delta)
    }

    /// Move the multiplier by the configured small or large step
    pub fn nudge_tempo(&mut self, step: Step, faster: bool) -> Result<f32, PlayerError> {
        self.set_tempo(self.tempo.nudged(step, faster))
    }

    pub fn reset_tempo(&mut self) -> Result<f32, PlayerError> {
        self.set_tempo(1.0)
    }

    fn apply_current_tempo(&mut self) -> Result<f32, PlayerError> {
        self.set_tempo(self.tempo.multiplier())
    }

    fn push_params(
        &mut self,
        channel: ChannelId,
        pitch_unit: Option<DspId>,
        params: TempoParams,
    ) -> Result<(), PlayerError> {
        debug!(
            "Tempo {:.2}x -> {} Hz, pitch {}",
            params.multiplier, params.frequency, params.pitch
        );
        self.backend.set_frequency(channel, params.frequency)?;
        if let Some(dsp) = pitch_unit {
            self.backend
                .set_dsp_parameter_float(dsp, pitch_shift::PITCH, params.pitch)?;
        }
        self.gate.tempo(format_multiplier(params.multiplier));
        Ok(())
    }

    /// Switch between corrected and natural pitch and re-apply the tempo
    pub fn toggle_pitch_correction(&mut self) -> Result<PitchMode, PlayerError> {
        self.active()?;
        let mode = self.tempo.toggle_pitch_mode();
        self.gate.pitch_correction(mode.label());
        self.apply_current_tempo()?;
        Ok(mode)
    }

    /// Flip pause; returns `true` when now paused
    pub fn toggle_play_pause(&mut self) -> Result<bool, PlayerError> {
        let channel = self.active()?.channel();
        self.resume_context()?;
        let paused = !self.backend.paused(channel)?;
        self.backend.set_paused(channel, paused)?;
        Ok(paused)
    }

    /// Move the play position by `delta_ms`, clamped to the track
    pub fn seek(&mut self, delta_ms: i64) -> Result<u32, PlayerError> {
        let session = self.active()?;
        let (channel, sound) = (session.channel(), session.sound());
        let position = self.backend.position(channel, TimeUnit::Ms)?;
        let length = self.backend.sound_length(sound, TimeUnit::Ms)?;
        let target = clamp_position(position, delta_ms, length);
        self.backend.set_position(channel, target, TimeUnit::Ms)?;
        Ok(target)
    }

    /// Seek by the configured small or large step
    pub fn skip(&mut self, step: Step, forward: bool) -> Result<u32, PlayerError> {
        let distance = self.settings.seek_ms(step) as i64;
        self.seek(if forward { distance } else { -distance })
    }

    pub fn transport(&self) -> Result<Transport, PlayerError> {
        let session = self.active()?;
        Ok(Transport {
            position_ms: self.backend.position(session.channel(), TimeUnit::Ms)?,
            length_ms: self.backend.sound_length(session.sound(), TimeUnit::Ms)?,
            paused: self.backend.paused(session.channel())?,
        })
    }
}

impl<B: AudioBackend> Drop for Player<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
