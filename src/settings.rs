//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/stackfall/settings.toml (or platform equivalent)

use crate::board::{DEFAULT_COLS, DEFAULT_ROWS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub keys: KeyBindings,
    pub gameplay: GameplaySettings,
    pub board: BoardSettings,
    pub audio: AudioSettings,
}

/// Key bindings (stored as strings for easy editing).
/// Each action accepts a single key or a list of keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(with = "one_or_many")]
    pub move_left: Vec<String>,
    #[serde(with = "one_or_many")]
    pub move_right: Vec<String>,
    #[serde(with = "one_or_many")]
    pub soft_drop: Vec<String>,
    #[serde(with = "one_or_many")]
    pub hard_drop: Vec<String>,
    #[serde(with = "one_or_many")]
    pub rotate_cw: Vec<String>,
    #[serde(with = "one_or_many")]
    pub rotate_ccw: Vec<String>,
    #[serde(with = "one_or_many")]
    pub pause: Vec<String>,
    #[serde(with = "one_or_many")]
    pub restart: Vec<String>,
    #[serde(with = "one_or_many")]
    pub toggle_sound: Vec<String>,
    #[serde(with = "one_or_many")]
    pub quit: Vec<String>,
}

/// `"Up"` and `["Up", "x"]` both read as a list; single keys write back as a string
mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        match keys {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(key) => vec![key],
            OneOrMany::Many(keys) => keys,
        })
    }
}

/// Gravity speed presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::Easy,
            Difficulty::Normal,
            Difficulty::Hard,
            Difficulty::Insane,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }

    pub fn from_name(name: &str) -> Option<Difficulty> {
        Self::all()
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// Milliseconds between gravity ticks
    pub fn tick_interval_ms(&self) -> u64 {
        match self {
            Difficulty::Easy => 800,
            Difficulty::Normal => 500,
            Difficulty::Hard => 250,
            Difficulty::Insane => 100,
        }
    }
}

/// Gameplay settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub difficulty: Difficulty,
    /// Overrides the difficulty preset when set. Passed through as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_interval_ms: Option<u64>,
}

impl GameplaySettings {
    pub fn tick_interval(&self) -> Duration {
        let ms = self
            .tick_interval_ms
            .unwrap_or_else(|| self.difficulty.tick_interval_ms());
        Duration::from_millis(ms)
    }
}

/// Board dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub cols: usize,
    pub rows: usize,
}

/// Audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sound_on: bool,
    /// BGM volume (0-100)
    pub bgm_volume: u32,
    /// SFX volume (0-100)
    pub sfx_volume: u32,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |list: &[&str]| list.iter().map(|k| k.to_string()).collect();
        Self {
            move_left: keys(&["Left", "a"]),
            move_right: keys(&["Right", "d"]),
            soft_drop: keys(&["Down", "s"]),
            hard_drop: keys(&["Space"]),
            rotate_cw: keys(&["Up", "w", "x"]),
            rotate_ccw: keys(&["z"]),
            pause: keys(&["p", "Esc"]),
            restart: keys(&["r"]),
            toggle_sound: keys(&["m"]),
            quit: keys(&["q"]),
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sound_on: true,
            bgm_volume: 25,
            sfx_volume: 50,
        }
    }
}

impl Settings {
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "stackfall", "stackfall").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the config directory, or defaults
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a file. Missing or broken files give defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Could not read settings {}: {}", path.display(), e);
                }
                return Self::default();
            }
        };
        toml::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring invalid settings {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Save settings to the config directory
    pub fn save(&self) -> io::Result<()> {
        let path = Self::settings_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, contents)
    }
}
