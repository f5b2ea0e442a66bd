//! Modal keyboard input handling for Stretto

mod commands;
mod modal;

pub use commands::Command;
pub use modal::{InputHandler, Mode};
