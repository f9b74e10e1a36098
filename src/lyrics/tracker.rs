use super::parse::{Cue, active_cue};

/// The lyric line currently shown, with a key that changes whenever the
/// active cue changes (so a view can re-trigger its highlight even when two
/// consecutive cues carry the same text).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LyricLine {
    pub text: String,
    pub key: u64,
}

/// Follows playback time and reports when the displayed lyric changes.
#[derive(Debug, Default)]
pub struct LyricTracker {
    active: Option<usize>,
    line: LyricLine,
    next_key: u64,
}

impl LyricTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &LyricLine {
        &self.line
    }

    /// Re-evaluate against `position`. Returns `true` if the displayed line changed.
    pub fn update(&mut self, cues: &[Cue], position: f64) -> bool {
        let index = cues.partition_point(|c| c.time <= position).checked_sub(1);
        if index == self.active {
            return false;
        }
        self.active = index;
        self.line = LyricLine {
            text: active_cue(cues, position)
                .map(|c| c.text.clone())
                .unwrap_or_default(),
            key: self.bump(),
        };
        true
    }

    /// Blank the displayed line (track change, pause, no lyrics).
    pub fn clear(&mut self) -> bool {
        if self.active.is_none() && self.line.text.is_empty() {
            return false;
        }
        self.active = None;
        self.line = LyricLine {
            text: String::new(),
            key: self.bump(),
        };
        true
    }

    fn bump(&mut self) -> u64 {
        self.next_key = self.next_key.wrapping_add(1);
        self.next_key
    }
}
