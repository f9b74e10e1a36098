use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::lyrics::Cue;

static NEXT_TRACK_ID: AtomicU64 = AtomicU64::new(1);

/// Stable track identity. Survives reordering; never reused within a process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(u64);

impl TrackId {
    pub fn next() -> Self {
        Self(NEXT_TRACK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to a track's playable byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    path: PathBuf,
}

impl AudioHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub handle: AudioHandle,
    /// File stem; the initial title and the lyric-matching key.
    pub display_name: String,
    pub title: String,
    pub artist: String,
    pub lyrics: Option<Vec<Cue>>,
    pub added_at: SystemTime,
}

impl Track {
    pub fn new(handle: AudioHandle, added_at: SystemTime) -> Self {
        let display_name = handle
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .or_else(|| handle.path().file_name().and_then(|s| s.to_str()))
            .unwrap_or("UNKNOWN")
            .to_string();

        Self {
            id: TrackId::next(),
            handle,
            title: display_name.clone(),
            display_name,
            artist: String::new(),
            lyrics: None,
            added_at,
        }
    }

    pub fn with_lyrics(mut self, cues: Vec<Cue>) -> Self {
        self.lyrics = if cues.is_empty() { None } else { Some(cues) };
        self
    }

    /// Title to show: the tag title when present, else the file stem.
    pub fn shown_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.display_name
        } else {
            &self.title
        }
    }

    pub fn has_lyrics(&self) -> bool {
        self.lyrics.as_ref().is_some_and(|l| !l.is_empty())
    }

    /// Two tracks with the same key are the same file added twice.
    pub fn dedup_key(&self) -> (&str, SystemTime) {
        (&self.display_name, self.added_at)
    }
}
