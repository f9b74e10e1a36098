use std::path::PathBuf;

use serde::Deserialize;

use crate::audio::EqSettings;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/lyrebird/config.toml` or `~/.config/lyrebird/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LYREBIRD__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial output gain, `0.0..=1.0`.
    pub volume: f32,
    /// Initial equalizer gains in dB (`-12..=12`, 0.5 dB steps).
    pub eq: EqSettings,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            eq: EqSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// How long a notification stays on screen (milliseconds).
    pub notification_ms: u64,

    /// Whether to render the synced lyric line under the now-playing block.
    pub show_lyrics: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ lyrebird ~ ".to_string(),
            notification_ms: 3500,
            show_lyrics: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Whether repeat starts enabled. Cannot be combined with `shuffle`.
    pub repeat: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Extension of companion lyric files.
    pub lyric_extension: String,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "wav", "ogg", "flac", "m4a"]
                .into_iter()
                .map(String::from)
                .collect(),
            lyric_extension: "lrc".to_string(),
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Install the file logger at all.
    pub enabled: bool,
    /// Default filter when `RUST_LOG` is not set (e.g. `info`, `lyrebird=debug`).
    pub level: String,
    /// Log file; defaults to `$XDG_CACHE_HOME/lyrebird/lyrebird.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            file: None,
        }
    }
}
