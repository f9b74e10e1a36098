//! Audio-related small types: EQ bands, graph node descriptions, and the
//! command/event vocabulary spoken with the media thread.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub const EQ_MIN_DB: f32 = -12.0;
pub const EQ_MAX_DB: f32 = 12.0;
pub const EQ_STEP_DB: f32 = 0.5;

pub const LOW_SHELF_HZ: f32 = 250.0;
pub const PEAKING_HZ: f32 = 1500.0;
pub const PEAKING_Q: f32 = 1.0;
pub const HIGH_SHELF_HZ: f32 = 4000.0;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Band {
    #[default]
    Low,
    Mid,
    High,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Low, Band::Mid, Band::High];

    /// Cycle low -> mid -> high -> low.
    pub fn next(self) -> Self {
        match self {
            Band::Low => Band::Mid,
            Band::Mid => Band::High,
            Band::High => Band::Low,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
        })
    }
}

/// Per-band gains in dB.
#[derive(Debug, Copy, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EqSettings {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl EqSettings {
    pub fn get(&self, band: Band) -> f32 {
        match band {
            Band::Low => self.low,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }

    pub fn set(&mut self, band: Band, value: f32) {
        match band {
            Band::Low => self.low = value,
            Band::Mid => self.mid = value,
            Band::High => self.high = value,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FilterKind {
    LowShelf,
    Peaking,
    HighShelf,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub frequency: f32,
    pub q: f32,
}

/// Node kinds the graph manager asks a backend to create.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NodeKind {
    /// The media element's output.
    Source,
    Gain,
    Filter(FilterSpec),
    Destination,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
}

/// Identifies one bound audio resource. Minted by the playback controller;
/// every media command and event carries the token it belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceToken(pub u64);

impl fmt::Display for ResourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res:{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum MediaErrorKind {
    #[error("source could not be opened")]
    Open,
    #[error("source could not be decoded")]
    Decode,
    #[error("no audio output device")]
    Output,
    #[error("seek failed")]
    Seek,
}

/// Why a play request did not start playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayRejection {
    /// The output refused to start (policy or device state).
    NotAllowed(String),
    /// Any other failure to start.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCmd {
    /// Replace the current source with `path`, paused at 0.
    Load { token: ResourceToken, path: PathBuf },
    /// Start or resume. After the end of the source, restarts from 0.
    Play,
    Pause,
    /// Jump to the given position in seconds.
    Seek(f64),
    /// Restart automatically at the end instead of reporting `Ended`.
    SetLoop(bool),
    /// Drop the source if it still belongs to `token`.
    Release(ResourceToken),
    /// Stop and drop whatever is loaded.
    Unload,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Source decoded and ready to play.
    Ready { duration: Option<f64> },
    /// Output is starved (re-opening after a seek).
    Waiting,
    /// Output resumed producing audio.
    Playing,
    /// Play request accepted.
    Play,
    Pause,
    TimeUpdate(f64),
    Ended,
    Error(MediaErrorKind),
    PlayRejected(PlayRejection),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub token: ResourceToken,
    pub kind: MediaEventKind,
}
