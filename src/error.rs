//! Error taxonomy shared by the player subsystems.
//!
//! Every variant is recoverable: callers either surface it as a transient
//! notification or log it and fall back to a safe state.

use std::path::PathBuf;

use thiserror::Error;

use crate::audio::{Band, MediaErrorKind};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("\"{0}\" is already in the playlist")]
    DuplicateTrack(String),

    #[error("no audio files found in {}", .0.display())]
    NoAudioFound(PathBuf),

    #[error("{} is not a supported audio file", .0.display())]
    NotAudio(PathBuf),

    #[error("lyrics \"{lyrics}\" do not match the current track (\"{track}\")")]
    LyricMismatch { lyrics: String, track: String },

    #[error("lyric file \"{0}\" is empty or has no valid lines")]
    LyricParseEmpty(String),

    #[error("lyrics for \"{0}\" are already loaded")]
    LyricsAlreadyLoaded(String),

    #[error("select or play a track before loading lyrics")]
    NoCurrentTrack,

    #[error("failed to read tags: {0}")]
    MetadataExtraction(String),

    #[error("playback was not allowed: {0}")]
    PlaybackDenied(String),

    #[error("media error: {0}")]
    Media(MediaErrorKind),

    #[error("{band} band gain {value} dB is outside -12..=12 or off the 0.5 dB grid")]
    InvalidEq { band: Band, value: f32 },

    #[error("audio graph: {0}")]
    Graph(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
