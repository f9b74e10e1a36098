use std::fmt;

/// Title shown while nothing is selected.
pub const NO_SONG_TITLE: &str = "No song playing";

/// Controller phases. `Ended` and `Error` are transient: they are entered
/// while an event is handled and resolved before the handler returns or as
/// soon as the follow-up play request is acknowledged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Ended => "ended",
            Phase::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub phase: Phase,
    /// What the user wants, as opposed to what the media thread reports.
    /// Read fresh whenever an asynchronous readiness signal arrives.
    pub play_intent: bool,
    /// Overlay bit; never blocks a phase change.
    pub buffering: bool,
    /// Seconds.
    pub position: f64,
    pub duration: Option<f64>,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Artwork {
    #[default]
    Placeholder,
    Embedded { mime: String, bytes: Vec<u8> },
}

/// What the now-playing panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub art: Artwork,
}

impl NowPlaying {
    pub fn placeholder() -> Self {
        Self {
            title: NO_SONG_TITLE.to_string(),
            artist: String::new(),
            art: Artwork::Placeholder,
        }
    }
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self::placeholder()
    }
}
