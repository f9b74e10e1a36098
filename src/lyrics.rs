//! Lyric engine: `.lrc` parsing and playback-time cue resolution.
//!
//! Cues are kept sorted by time so the active line can be found with a
//! binary search on every position update.

mod parse;
mod tracker;

pub use parse::{Cue, active_cue, parse};
pub use tracker::{LyricLine, LyricTracker};

#[cfg(test)]
mod tests;
