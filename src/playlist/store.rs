use rand::Rng;
use tracing::debug;

use crate::error::{PlayerError, Result};
use crate::library::{Track, TrackId};
use crate::lyrics::Cue;

use super::shuffle::{random_other, reshuffle};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Tag title, else display name (case-insensitive).
    Title,
    /// Artist (case-insensitive).
    Artist,
    /// File modification time, oldest first.
    AddedAt,
}

/// Where "next" (or an auto-advance) should go.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Advance {
    To(usize),
    /// End of a non-repeating playlist: halt instead of wrapping.
    Stop,
}

/// Result of removing a track.
#[derive(Debug)]
pub struct Removal {
    pub track: Track,
    pub was_current: bool,
}

/// Ordered track collection plus the current-index pointer and the
/// repeat/shuffle modes. The only place where track order changes.
#[derive(Debug, Default)]
pub struct PlaylistStore {
    tracks: Vec<Track>,
    current: Option<usize>,
    repeating: bool,
    shuffling: bool,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn repeating(&self) -> bool {
        self.repeating
    }

    pub fn shuffling(&self) -> bool {
        self.shuffling
    }

    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    fn contains_key(&self, track: &Track) -> bool {
        self.tracks.iter().any(|t| t.dedup_key() == track.dedup_key())
    }

    /// Point at `index`. Returns `false` (and changes nothing) when out of range.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Append tracks, silently skipping duplicates. Returns how many were added.
    pub fn add_many<R: Rng + ?Sized>(&mut self, incoming: Vec<Track>, rng: &mut R) -> usize {
        let was_empty = self.tracks.is_empty();
        let before = self.tracks.len();

        for track in incoming {
            if self.contains_key(&track) {
                debug!(name = %track.display_name, "skipping duplicate track");
                continue;
            }
            self.tracks.push(track);
        }

        let added = self.tracks.len() - before;
        if added > 0 {
            self.after_insert(was_empty, rng);
        }
        added
    }

    /// Append one track. A duplicate is rejected and nothing changes.
    pub fn add_one<R: Rng + ?Sized>(&mut self, track: Track, rng: &mut R) -> Result<TrackId> {
        if self.contains_key(&track) {
            return Err(PlayerError::DuplicateTrack(track.display_name));
        }
        let was_empty = self.tracks.is_empty();
        let id = track.id;
        self.tracks.push(track);
        self.after_insert(was_empty, rng);
        Ok(id)
    }

    fn after_insert<R: Rng + ?Sized>(&mut self, was_empty: bool, rng: &mut R) {
        if self.shuffling {
            self.reshuffle_pinned(rng);
        } else if was_empty {
            self.current = Some(0);
        }
    }

    fn reshuffle_pinned<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let current_id = self.current().map(|t| t.id);
        let tracks = std::mem::take(&mut self.tracks);
        let (tracks, current) = reshuffle(tracks, current_id, rng);
        self.tracks = tracks;
        self.current = current;
    }

    /// Remove the track at `index`, keeping `current` on the same identity,
    /// or on the following track (wrapping) when the current one is removed.
    pub fn remove(&mut self, index: usize) -> Option<Removal> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        let was_current = self.current == Some(index);

        self.current = match self.current {
            _ if self.tracks.is_empty() => None,
            Some(cur) if cur == index => Some(index % self.tracks.len()),
            Some(cur) if cur > index => Some(cur - 1),
            other => other,
        };

        Some(Removal { track, was_current })
    }

    /// Stable ascending sort; `current` follows its track, not its slot.
    pub fn sort_by(&mut self, key: SortKey) {
        let current_id = self.current().map(|t| t.id);

        match key {
            SortKey::Title => self
                .tracks
                .sort_by_cached_key(|t| t.shown_title().to_lowercase()),
            SortKey::Artist => self.tracks.sort_by_cached_key(|t| t.artist.to_lowercase()),
            SortKey::AddedAt => self.tracks.sort_by_key(|t| t.added_at),
        }

        if let Some(id) = current_id {
            self.current = self.position_of(id);
        }
    }

    /// Toggle shuffle. Turning it on disables repeat and reshuffles with the
    /// current track pinned first. Turning it off keeps the order as-is.
    pub fn toggle_shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.shuffling = !self.shuffling;
        if self.shuffling {
            self.repeating = false;
            self.reshuffle_pinned(rng);
        }
        self.shuffling
    }

    /// Toggle repeat. Turning it on disables shuffle.
    pub fn toggle_repeat(&mut self) -> bool {
        self.repeating = !self.repeating;
        if self.repeating {
            self.shuffling = false;
        }
        self.repeating
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
        self.repeating = false;
        self.shuffling = false;
    }

    /// Target for "next" (also used for auto-advance at the end of a track).
    pub fn next_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Advance> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        if self.shuffling {
            return Some(Advance::To(random_other(len, self.current, rng)));
        }
        match self.current {
            Some(cur) if cur + 1 >= len => {
                if self.repeating {
                    Some(Advance::To(0))
                } else {
                    Some(Advance::Stop)
                }
            }
            Some(cur) => Some(Advance::To(cur + 1)),
            None => Some(Advance::To(0)),
        }
    }

    /// Target for "previous": random other track when shuffling, else the
    /// preceding index with wraparound.
    pub fn previous_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        if self.shuffling {
            return Some(random_other(len, self.current, rng));
        }
        Some(match self.current {
            Some(cur) => (cur + len - 1) % len,
            None => len - 1,
        })
    }

    /// Replace title/artist on the track with `id`. Returns whether anything changed.
    pub fn update_tags(&mut self, id: TrackId, title: &str, artist: &str) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if track.title == title && track.artist == artist {
            return false;
        }
        track.title = title.to_string();
        track.artist = artist.to_string();
        true
    }

    pub fn set_lyrics(&mut self, id: TrackId, cues: Vec<Cue>) -> bool {
        match self.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) => {
                track.lyrics = Some(cues);
                true
            }
            None => false,
        }
    }

    /// Indices (in playlist order) whose name, title or artist contains `query`,
    /// ignoring case. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let q = query.to_lowercase();
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                q.is_empty()
                    || t.display_name.to_lowercase().contains(&q)
                    || t.title.to_lowercase().contains(&q)
                    || t.artist.to_lowercase().contains(&q)
            })
            .map(|(i, _)| i)
            .collect()
    }
}
