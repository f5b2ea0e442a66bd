//! Modal state machine for keyboard input

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use stretto_audio::Step;

use crate::commands::Command;

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
        }
    }
}

/// Handles keyboard input and converts to commands
#[derive(Debug, Default)]
pub struct InputHandler {
    mode: Mode,
    command_buffer: String,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current command line (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Command => self.handle_command_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }

            KeyCode::Char(' ') => Some(Command::TogglePlay),
            KeyCode::Char('p') => Some(Command::TogglePitchCorrection),

            // Seek
            KeyCode::Left => Some(seek(if shift { Step::Large } else { Step::Small }, false)),
            KeyCode::Right => Some(seek(if shift { Step::Large } else { Step::Small }, true)),
            KeyCode::Char('H') => Some(seek(Step::Large, false)),
            KeyCode::Char('L') => Some(seek(Step::Large, true)),

            // Tempo
            KeyCode::Char('[') => Some(nudge(Step::Small, false)),
            KeyCode::Char(']') => Some(nudge(Step::Small, true)),
            KeyCode::Char('{') => Some(nudge(Step::Large, false)),
            KeyCode::Char('}') => Some(nudge(Step::Large, true)),
            KeyCode::Char('0') => Some(Command::ResetTempo),

            KeyCode::Char('q') => Some(Command::Quit),

            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                let cmd = parse_command(&self.command_buffer);
                self.mode = Mode::Normal;
                let buffer = std::mem::take(&mut self.command_buffer);
                cmd.or(Some(Command::ExecuteCommand(buffer)))
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_buffer.clear();
                Some(Command::EnterNormalMode)
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = Mode::Normal;
                    Some(Command::EnterNormalMode)
                } else {
                    None
                }
            }
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }
}

fn seek(step: Step, forward: bool) -> Command {
    Command::Seek { step, forward }
}

fn nudge(step: Step, faster: bool) -> Command {
    Command::NudgeTempo { step, faster }
}

/// Parse a command line (without the leading `:`)
pub(crate) fn parse_command(line: &str) -> Option<Command> {
    let input = line.trim();

    if input == "q" || input == "quit" {
        return Some(Command::Quit);
    }
    if input == "reset" {
        return Some(Command::ResetTempo);
    }

    if let Some(rest) = input.strip_prefix("load ") {
        let path = strip_quotes(rest.trim());
        if !path.is_empty() {
            return Some(Command::LoadTrack(path.into()));
        }
    }

    if let Some(rest) = input.strip_prefix("tempo ") {
        let value = rest.trim().trim_end_matches('x');
        if let Ok(multiplier) = value.parse::<f32>() {
            return Some(Command::SetTempo(multiplier));
        }
    }

    None
}

fn strip_quotes(path: &str) -> &str {
    if path.len() >= 2
        && ((path.starts_with('\'') && path.ends_with('\''))
            || (path.starts_with('"') && path.ends_with('"')))
    {
        &path[1..path.len() - 1]
    } else {
        path
    }
}
