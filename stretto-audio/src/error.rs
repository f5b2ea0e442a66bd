//! Player errors

use crate::backend::EngineError;
use thiserror::Error;

/// Errors surfaced by [`crate::Player`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The engine could not be brought up. Nothing else will work.
    #[error("Audio engine failed to start: {0}")]
    EngineInit(#[source] EngineError),
    /// The selected file could not be turned into a playing track
    #[error("Could not load track: {0}")]
    Decode(#[source] EngineError),
    /// A pitch-shift unit could not be created or attached
    #[error("Pitch correction unavailable: {0}")]
    DspCreation(#[source] EngineError),
    /// A tempo, seek or transport action arrived with no track loaded
    #[error("No track loaded")]
    NoActiveSession,
    /// A load was requested while another is still in flight
    #[error("A track is already loading")]
    LoadInProgress,
    /// `finish_load` without a matching `begin_load`
    #[error("No load in progress")]
    NotLoading,
    /// Any other engine call failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}
