use super::*;
use crate::audio::Band;
use crate::library::{AudioHandle, Track};
use crate::playlist::PlaylistStore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, SystemTime};

fn store_of(names: &[&str]) -> PlaylistStore {
    let mut s = PlaylistStore::new();
    let tracks = names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            Track::new(
                AudioHandle::new(format!("/music/{n}.mp3")),
                SystemTime::UNIX_EPOCH + Duration::from_secs(i as u64),
            )
        })
        .collect();
    s.add_many(tracks, &mut StdRng::seed_from_u64(1));
    s
}

#[test]
fn display_indices_respects_filter_query() {
    let store = store_of(&["Alpha", "Beta", "Gamma"]);
    let mut app = App::new();
    assert_eq!(app.display_indices(&store), vec![0, 1, 2]);

    app.enter_filter_mode();
    app.push_filter_char('m', &store);
    assert_eq!(app.display_indices(&store), vec![2]);
    assert_eq!(app.selected, 2);
}

#[test]
fn clear_filter_restores_everything() {
    let store = store_of(&["Alpha", "Beta", "Gamma"]);
    let mut app = App::new();
    app.enter_filter_mode();
    app.push_filter_char('b', &store);
    assert_eq!(app.selected, 1);

    app.clear_filter(&store);
    assert_eq!(app.mode, InputMode::Normal);
    assert!(app.filter_query.is_empty());
    assert_eq!(app.display_indices(&store).len(), 3);
    assert_eq!(app.selected, 1);
}

#[test]
fn exit_filter_mode_keeps_query() {
    let store = store_of(&["Alpha", "Beta"]);
    let mut app = App::new();
    app.enter_filter_mode();
    app.push_filter_char('e', &store);
    app.exit_filter_mode();
    assert_eq!(app.mode, InputMode::Normal);
    assert_eq!(app.display_indices(&store), vec![1]);

    app.pop_filter_char(&store);
    assert_eq!(app.display_indices(&store).len(), 2);
}

#[test]
fn next_and_prev_wrap_within_view() {
    let store = store_of(&["a1", "b", "a2", "a3"]);
    let mut app = App::new();
    app.push_filter_char('a', &store);
    assert_eq!(app.selected, 0);

    app.next(&store);
    assert_eq!(app.selected, 2);
    app.next(&store);
    assert_eq!(app.selected, 3);
    app.next(&store);
    assert_eq!(app.selected, 0);
    app.prev(&store);
    assert_eq!(app.selected, 3);
}

#[test]
fn navigation_on_empty_view_is_a_no_op() {
    let store = PlaylistStore::new();
    let mut app = App::new();
    app.next(&store);
    app.prev(&store);
    assert_eq!(app.selected, 0);
    assert_eq!(app.selected_visible(&store), None);
}

#[test]
fn ensure_selected_visible_clamps_after_removal() {
    let mut store = store_of(&["a", "b", "c"]);
    let mut app = App::new();
    app.selected = 2;
    store.remove(2);
    app.ensure_selected_visible(&store);
    assert_eq!(app.selected, 1);
}

#[test]
fn follow_current_moves_cursor_once_per_change() {
    let mut store = store_of(&["a", "b", "c"]);
    let mut app = App::new();
    app.follow_current(&store);
    assert_eq!(app.selected, 0);

    app.selected = 2;
    app.follow_current(&store);
    assert_eq!(app.selected, 2, "unchanged current leaves the cursor alone");

    store.set_current(1);
    app.follow_current(&store);
    assert_eq!(app.selected, 1);
}

#[test]
fn prompt_collects_and_trims_entry() {
    let mut app = App::new();
    app.open_prompt();
    assert_eq!(app.mode, InputMode::Prompt);
    for c in " /music/x ".chars() {
        app.push_prompt_char(c);
    }
    app.pop_prompt_char();
    assert_eq!(app.take_prompt().as_deref(), Some("/music/x"));
    assert_eq!(app.mode, InputMode::Normal);
    assert!(app.prompt.is_empty());

    app.open_prompt();
    app.push_prompt_char(' ');
    assert_eq!(app.take_prompt(), None);
}

#[test]
fn cancel_prompt_discards_input() {
    let mut app = App::new();
    app.open_prompt();
    app.push_prompt_char('x');
    app.cancel_prompt();
    assert_eq!(app.mode, InputMode::Normal);
    assert!(app.prompt.is_empty());
}

#[test]
fn eq_focus_cycles_bands() {
    let mut app = App::new();
    assert_eq!(app.eq_focus, Band::Low);
    app.cycle_eq_focus();
    assert_eq!(app.eq_focus, Band::Mid);
    app.cycle_eq_focus();
    app.cycle_eq_focus();
    assert_eq!(app.eq_focus, Band::Low);
}
