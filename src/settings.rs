//! Game settings
//!
//! Read from a flat text file of `key value` pairs, e.g.
//!
//! ```text
//! mode 2
//! red 1
//! black 3
//! winscore 100
//! ```
//!
//! Keys are case-insensitive and unknown keys are skipped.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_ACCEL, DEFAULT_MAX_SPEED};

/// Screen mode presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScreenMode {
    #[default]
    Vga,
    Svga,
    Xga,
    Sxga,
}

impl ScreenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenMode::Vga => "640x480",
            ScreenMode::Svga => "800x600",
            ScreenMode::Xga => "1024x768",
            ScreenMode::Sxga => "1280x1024",
        }
    }

    /// Mode number as written in the settings file (1-4)
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(ScreenMode::Vga),
            2 => Some(ScreenMode::Svga),
            3 => Some(ScreenMode::Xga),
            4 => Some(ScreenMode::Sxga),
            _ => None,
        }
    }

    /// Arena width and height in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ScreenMode::Vga => (640, 480),
            ScreenMode::Svga => (800, 600),
            ScreenMode::Xga => (1024, 768),
            ScreenMode::Sxga => (1280, 1024),
        }
    }
}

/// Errors from reading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] io::Error),
    #[error("setting `{0}` has no value")]
    MissingValue(String),
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub mode: ScreenMode,
    /// Platform hint; the simulation ignores it
    pub fullscreen: bool,

    // === Balls ===
    /// Catchable scoring balls
    pub red: u32,
    /// Obstacle balls
    pub black: u32,
    /// Gold balls released after `duration` seconds
    pub gold: u32,
    /// Points for bringing home a gold ball
    pub gold_points: u32,
    /// Seconds of play before gold balls appear
    pub duration: u32,

    // === Rules ===
    pub win_score: u32,

    // === Movement ===
    pub accel: f32,
    pub max_speed: f32,
    /// Whether players may accelerate downwards
    pub dive: bool,

    // === Platform ===
    /// Frame rate cap for the platform loop
    pub max_fps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ScreenMode::Vga,
            fullscreen: true,

            red: 1,
            black: 2,
            gold: 0,
            gold_points: 150,
            duration: 60,

            win_score: 50,

            accel: DEFAULT_ACCEL,
            max_speed: DEFAULT_MAX_SPEED,
            dive: true,

            max_fps: 100,
        }
    }
}

impl Settings {
    /// Default settings file name, looked up in the working directory
    pub const FILE_NAME: &'static str = "settings.txt";

    /// Load settings from a file. A missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let settings = Self::parse(&text)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse `key value` pairs on top of the defaults
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        let mut tokens = text
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.starts_with('#'))
            .flat_map(str::split_whitespace);

        while let Some(key) = tokens.next() {
            let key = key.to_ascii_lowercase();
            if !Self::is_known(&key) {
                log::debug!("Ignoring unknown setting `{}`", key);
                continue;
            }
            let value = tokens
                .next()
                .ok_or_else(|| SettingsError::MissingValue(key.clone()))?;
            settings.apply(&key, value);
        }

        Ok(settings)
    }

    fn is_known(key: &str) -> bool {
        matches!(
            key,
            "mode"
                | "fullscreen"
                | "red"
                | "black"
                | "gold"
                | "goldval"
                | "goldpoints"
                | "duration"
                | "winscore"
                | "accel"
                | "maxspeed"
                | "maxfps"
                | "dive"
        )
    }

    /// Set one known key. Values that do not parse leave the default in place.
    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "mode" => {
                if let Some(n) = parse_value(key, value) {
                    match ScreenMode::from_number(n) {
                        Some(mode) => self.mode = mode,
                        None => log::warn!("Unknown screen mode {}, keeping {}", n, self.mode.as_str()),
                    }
                }
            }
            "fullscreen" => set(&mut self.fullscreen, parse_flag(key, value)),
            "red" => set(&mut self.red, parse_value(key, value)),
            "black" => set(&mut self.black, parse_value(key, value)),
            "gold" => set(&mut self.gold, parse_value(key, value)),
            "goldval" | "goldpoints" => set(&mut self.gold_points, parse_value(key, value)),
            "duration" => set(&mut self.duration, parse_value(key, value)),
            "winscore" => set(&mut self.win_score, parse_value(key, value)),
            "accel" => set(&mut self.accel, parse_value(key, value)),
            "maxspeed" => set(&mut self.max_speed, parse_value(key, value)),
            "maxfps" => set(&mut self.max_fps, parse_value(key, value)),
            "dive" => set(&mut self.dive, parse_flag(key, value)),
            _ => {}
        }
    }

    /// Milliseconds per frame at the configured frame cap
    pub fn frame_budget_ms(&self) -> u32 {
        1000 / self.max_fps.max(1)
    }

    /// Write back in the same `key value` format
    pub fn to_text(&self) -> String {
        let mode = match self.mode {
            ScreenMode::Vga => 1,
            ScreenMode::Svga => 2,
            ScreenMode::Xga => 3,
            ScreenMode::Sxga => 4,
        };
        format!(
            "mode {}\nfullscreen {}\nred {}\nblack {}\ngold {}\ngoldval {}\nduration {}\n\
             winscore {}\naccel {}\nmaxspeed {}\nmaxfps {}\ndive {}\n",
            mode,
            u8::from(self.fullscreen),
            self.red,
            self.black,
            self.gold,
            self.gold_points,
            self.duration,
            self.win_score,
            self.accel,
            self.max_speed,
            self.max_fps,
            u8::from(self.dive),
        )
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        log::warn!("Ignoring invalid value {:?} for setting `{}`", value, key);
    }
    parsed
}

fn parse_flag(key: &str, value: &str) -> Option<bool> {
    parse_value::<u32>(key, value).map(|n| n != 0)
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides_defaults() {
        let settings = Settings::parse("mode 2\nRED 2\nBlack 0\nwinscore 100\naccel 1.5\n").unwrap();
        assert_eq!(settings.mode, ScreenMode::Svga);
        assert_eq!(settings.mode.dimensions(), (800, 600));
        assert_eq!(settings.red, 2);
        assert_eq!(settings.black, 0);
        assert_eq!(settings.win_score, 100);
        assert_eq!(settings.accel, 1.5);
        assert_eq!(settings.max_speed, DEFAULT_MAX_SPEED);
    }

    #[test]
    fn test_unknown_keys_and_comments_skipped() {
        let settings = Settings::parse("# tuning\nsky blue\nmaxfps 60\n").unwrap();
        // `blue` is read as an unknown key too
        assert_eq!(settings.max_fps, 60);
        assert_eq!(settings.frame_budget_ms(), 16);
    }

    #[test]
    fn test_bad_mode_keeps_default() {
        let settings = Settings::parse("mode 9").unwrap();
        assert_eq!(settings.mode, ScreenMode::Vga);
    }

    #[test]
    fn test_invalid_value_keeps_default_and_rest_of_file() {
        let settings = Settings::parse("winscore lots
red 3
accel fast
mode x
black 4").unwrap();
        assert_eq!(settings.win_score, 50);
        assert_eq!(settings.accel, DEFAULT_ACCEL);
        assert_eq!(settings.mode, ScreenMode::Vga);
        assert_eq!(settings.red, 3);
        assert_eq!(settings.black, 4);
    }

    #[test]
    fn test_missing_value_is_error() {
        let err = Settings::parse("red 1\nblack").unwrap_err();
        assert!(matches!(err, SettingsError::MissingValue(ref key) if key == "black"));
    }

    #[test]
    fn test_flags_and_gold() {
        let settings = Settings::parse("fullscreen 0\ndive 0\ngold 1\ngoldpoints 200\nduration 30").unwrap();
        assert!(!settings.fullscreen);
        assert!(!settings.dive);
        assert_eq!(settings.gold, 1);
        assert_eq!(settings.gold_points, 200);
        assert_eq!(settings.duration, 30);
    }

    #[test]
    fn test_text_round_trip() {
        let settings = Settings {
            mode: ScreenMode::Xga,
            black: 3,
            accel: 2.5,
            ..Settings::default()
        };
        assert_eq!(Settings::parse(&settings.to_text()).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load("/nonexistent/broomsticks/settings.txt").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
