//! Configuration persistence for Stretto
//!
//! Plain `key=value` lines; unknown keys and unparsable values are ignored
//! so an older or hand-edited file never stops the player from starting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stretto_audio::PlayerSettings;
use tracing::warn;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub volume: f32,
    pub autoplay: bool,
    pub tempo_small_step: f32,
    pub tempo_large_step: f32,
    pub seek_small_ms: u32,
    pub seek_large_ms: u32,
    pub pitch_window: i32,
    /// Track opened last, reloaded when no path is given on the command line
    pub last_track: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = PlayerSettings::default();
        Self {
            volume: settings.volume,
            autoplay: settings.autoplay,
            tempo_small_step: settings.tempo_small_step,
            tempo_large_step: settings.tempo_large_step,
            seek_small_ms: settings.seek_small_ms,
            seek_large_ms: settings.seek_large_ms,
            pitch_window: settings.pitch_window,
            last_track: None,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path()).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.serialize())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stretto")
            .join("config.txt")
    }

    /// Player settings with this config's overrides applied
    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            volume: self.volume.clamp(0.0, 1.0),
            autoplay: self.autoplay,
            tempo_small_step: self.tempo_small_step,
            tempo_large_step: self.tempo_large_step,
            seek_small_ms: self.seek_small_ms,
            seek_large_ms: self.seek_large_ms,
            pitch_window: self.pitch_window,
            ..PlayerSettings::default()
        }
    }

    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            let ok = match key {
                "volume" => set(&mut config.volume, value),
                "autoplay" => set(&mut config.autoplay, value),
                "tempo_small_step" => set(&mut config.tempo_small_step, value),
                "tempo_large_step" => set(&mut config.tempo_large_step, value),
                "seek_small_ms" => set(&mut config.seek_small_ms, value),
                "seek_large_ms" => set(&mut config.seek_large_ms, value),
                "pitch_window" => set(&mut config.pitch_window, value),
                "last_track" => {
                    if !value.is_empty() {
                        config.last_track = Some(PathBuf::from(value));
                    }
                    true
                }
                _ => true,
            };
            if !ok {
                warn!("Ignoring bad config value {}={}", key, value);
            }
        }

        config
    }

    fn serialize(&self) -> String {
        let mut lines = vec![
            "# Stretto Configuration".to_string(),
            format!("volume={}", self.volume),
            format!("autoplay={}", self.autoplay),
            format!("tempo_small_step={}", self.tempo_small_step),
            format!("tempo_large_step={}", self.tempo_large_step),
            format!("seek_small_ms={}", self.seek_small_ms),
            format!("seek_large_ms={}", self.seek_large_ms),
            format!("pitch_window={}", self.pitch_window),
        ];
        if let Some(ref track) = self.last_track {
            lines.push(format!("last_track={}", track.display()));
        }
        lines.join("\n")
    }
}

fn set<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse() {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(Config::parse(""), Config::default());
    }

    #[test]
    fn test_parse_overrides() {
        let content = "# Comment\nvolume=0.8\nautoplay=false\nseek_large_ms=30000\nlast_track=/music/a.mp3";
        let config = Config::parse(content);
        assert_eq!(config.volume, 0.8);
        assert!(!config.autoplay);
        assert_eq!(config.seek_large_ms, 30000);
        assert_eq!(config.last_track, Some(PathBuf::from("/music/a.mp3")));
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = Config::parse("volume=loud\nseek_small_ms=-5\nnonsense");
        assert_eq!(config.volume, Config::default().volume);
        assert_eq!(config.seek_small_ms, 5000);
    }

    #[test]
    fn test_player_settings_clamp_volume() {
        let config = Config {
            volume: 3.0,
            ..Config::default()
        };
        let settings = config.player_settings();
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.max_channels, 2048);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("stretto-config-{}", std::process::id()))
            .join("config.txt");
        let config = Config {
            tempo_large_step: 0.5,
            last_track: Some(PathBuf::from("/test/track.flac")),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
