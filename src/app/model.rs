//! Application model: `App` and `InputMode`.
//!
//! `App` holds only what the terminal needs on top of the playback controller:
//! the list cursor, the search query, the path prompt and the focused EQ band.
//! Track data lives in the controller's `PlaylistStore` and is passed in.

use crate::audio::Band;
use crate::playlist::PlaylistStore;

/// Where typed characters go.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Characters extend the search query.
    Filter,
    /// Characters extend the path prompt.
    Prompt,
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    /// Playlist index under the cursor.
    pub selected: usize,
    pub mode: InputMode,
    pub filter_query: String,
    pub prompt: String,
    pub eq_focus: Band,
    /// Cursor jumps to the current track whenever it changes.
    pub follow_playback: bool,
    last_current: Option<usize>,
}

impl App {
    pub fn new() -> Self {
        Self {
            follow_playback: true,
            ..Self::default()
        }
    }

    /// Playlist indices visible under the active search, in playlist order.
    pub fn display_indices(&self, store: &PlaylistStore) -> Vec<usize> {
        store.search(self.filter_query.trim())
    }

    /// Return the next visible index after `current`, wrapping to the first.
    pub fn next_in_view_from(&self, store: &PlaylistStore, current: usize) -> Option<usize> {
        let display = self.display_indices(store);
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index before `current`, wrapping to the last.
    pub fn prev_in_view_from(&self, store: &PlaylistStore, current: usize) -> Option<usize> {
        let display = self.display_indices(store);
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) | None => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self, store: &PlaylistStore) {
        if let Some(next) = self.next_in_view_from(store, self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self, store: &PlaylistStore) {
        if let Some(prev) = self.prev_in_view_from(store, self.selected) {
            self.selected = prev;
        }
    }

    /// The selected index if it names a visible track.
    pub fn selected_visible(&self, store: &PlaylistStore) -> Option<usize> {
        self.display_indices(store)
            .contains(&self.selected)
            .then_some(self.selected)
    }

    /// Keep `selected` on a visible track after the playlist or query changed.
    pub fn ensure_selected_visible(&mut self, store: &PlaylistStore) {
        let display = self.display_indices(store);
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display
                .iter()
                .copied()
                .find(|&i| i >= self.selected)
                .unwrap_or(display[display.len() - 1]);
        }
    }

    /// Move the cursor to the current track when it changed since the last call.
    pub fn follow_current(&mut self, store: &PlaylistStore) {
        let current = store.current_index();
        if current == self.last_current {
            return;
        }
        self.last_current = current;
        if let Some(idx) = current.filter(|_| self.follow_playback) {
            if self.display_indices(store).contains(&idx) {
                self.selected = idx;
            }
        }
    }

    pub fn enter_filter_mode(&mut self) {
        self.mode = InputMode::Filter;
    }

    /// Leave filter mode, keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.mode = InputMode::Normal;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self, store: &PlaylistStore) {
        self.filter_query.clear();
        self.mode = InputMode::Normal;
        self.ensure_selected_visible(store);
    }

    pub fn push_filter_char(&mut self, c: char, store: &PlaylistStore) {
        self.filter_query.push(c);
        self.ensure_selected_visible(store);
    }

    pub fn pop_filter_char(&mut self, store: &PlaylistStore) {
        self.filter_query.pop();
        self.ensure_selected_visible(store);
    }

    pub fn open_prompt(&mut self) {
        self.prompt.clear();
        self.mode = InputMode::Prompt;
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt.clear();
        self.mode = InputMode::Normal;
    }

    /// Close the prompt and hand back what was typed, trimmed.
    pub fn take_prompt(&mut self) -> Option<String> {
        self.mode = InputMode::Normal;
        let entry = std::mem::take(&mut self.prompt);
        let entry = entry.trim();
        (!entry.is_empty()).then(|| entry.to_string())
    }

    pub fn push_prompt_char(&mut self, c: char) {
        self.prompt.push(c);
    }

    pub fn pop_prompt_char(&mut self) {
        self.prompt.pop();
    }

    pub fn cycle_eq_focus(&mut self) {
        self.eq_focus = self.eq_focus.next();
    }
}
