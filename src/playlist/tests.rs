use super::*;
use crate::error::PlayerError;
use crate::library::{AudioHandle, Track, TrackId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, SystemTime};

fn track(name: &str, added_secs: u64) -> Track {
    Track::new(
        AudioHandle::new(format!("/music/{name}.mp3")),
        SystemTime::UNIX_EPOCH + Duration::from_secs(added_secs),
    )
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn store_of(names: &[&str]) -> PlaylistStore {
    let mut s = PlaylistStore::new();
    let tracks = names
        .iter()
        .enumerate()
        .map(|(i, n)| track(n, i as u64))
        .collect();
    s.add_many(tracks, &mut rng());
    s
}

fn order(s: &PlaylistStore) -> Vec<&str> {
    s.tracks().iter().map(|t| t.display_name.as_str()).collect()
}

fn current_id(s: &PlaylistStore) -> Option<TrackId> {
    s.current().map(|t| t.id)
}

#[test]
fn add_many_into_empty_sets_current_to_first() {
    let s = store_of(&["a", "b", "c"]);
    assert_eq!(s.current_index(), Some(0));
    assert_eq!(order(&s), vec!["a", "b", "c"]);
}

#[test]
fn add_many_skips_duplicates_silently() {
    let mut s = store_of(&["a", "b"]);
    let mut r = rng();
    let added = s.add_many(vec![track("a", 0), track("c", 9), track("c", 9)], &mut r);
    assert_eq!(added, 1);
    assert_eq!(order(&s), vec!["a", "b", "c"]);
}

#[test]
fn same_name_with_different_mtime_is_not_a_duplicate() {
    let mut s = store_of(&["a"]);
    assert_eq!(s.add_many(vec![track("a", 42)], &mut rng()), 1);
    assert_eq!(s.len(), 2);
}

#[test]
fn add_one_reports_duplicates_and_changes_nothing() {
    let mut s = store_of(&["a", "b"]);
    s.set_current(1);
    let err = s.add_one(track("a", 0), &mut rng()).unwrap_err();
    assert!(matches!(err, PlayerError::DuplicateTrack(ref n) if n == "a"));
    assert_eq!(order(&s), vec!["a", "b"]);
    assert_eq!(s.current_index(), Some(1));
}

#[test]
fn add_one_keeps_current_when_not_shuffling() {
    let mut s = store_of(&["a", "b"]);
    s.set_current(1);
    let before = current_id(&s);
    s.add_one(track("c", 5), &mut rng()).unwrap();
    assert_eq!(current_id(&s), before);
    assert_eq!(s.current_index(), Some(1));
}

#[test]
fn add_while_shuffling_pins_current_first() {
    let mut r = rng();
    let mut s = store_of(&["a", "b", "c", "d"]);
    s.set_current(2);
    let cur = current_id(&s);
    s.toggle_shuffle(&mut r);

    s.add_many(vec![track("e", 10), track("f", 11)], &mut r);
    assert_eq!(s.current_index(), Some(0));
    assert_eq!(current_id(&s), cur);
    assert_eq!(s.len(), 6);
}

#[test]
fn remove_current_moves_to_following_track() {
    for n in 2..6usize {
        for i in 0..n {
            let names: Vec<String> = (0..n).map(|k| format!("t{k}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut s = store_of(&refs);
            s.set_current(i);

            let removal = s.remove(i).unwrap();
            assert!(removal.was_current);
            assert_eq!(s.current_index(), Some(i % (n - 1)), "n={n} i={i}");
        }
    }
}

#[test]
fn remove_before_current_keeps_identity() {
    let mut s = store_of(&["a", "b", "c", "d"]);
    s.set_current(2);
    let cur = current_id(&s);

    let removal = s.remove(0).unwrap();
    assert!(!removal.was_current);
    assert_eq!(s.current_index(), Some(1));
    assert_eq!(current_id(&s), cur);

    s.remove(2).unwrap();
    assert_eq!(current_id(&s), cur);
}

#[test]
fn remove_last_track_empties_current() {
    let mut s = store_of(&["only"]);
    let removal = s.remove(0).unwrap();
    assert!(removal.was_current);
    assert_eq!(s.current_index(), None);
    assert!(s.remove(0).is_none());
}

#[test]
fn sort_by_title_is_case_insensitive_and_tracks_current() {
    let mut s = store_of(&["beta", "Alpha", "gamma"]);
    s.set_current(0);
    let cur = current_id(&s);

    s.sort_by(SortKey::Title);
    assert_eq!(order(&s), vec!["Alpha", "beta", "gamma"]);
    assert_eq!(current_id(&s), cur);
    assert_eq!(s.current_index(), Some(1));
}

#[test]
fn sort_by_title_prefers_tag_title() {
    let mut s = store_of(&["zz", "aa"]);
    let id = s.tracks()[0].id;
    s.update_tags(id, "A", "");
    s.sort_by(SortKey::Title);
    assert_eq!(order(&s), vec!["zz", "aa"]);
}

#[test]
fn sort_is_stable_and_idempotent() {
    let mut s = store_of(&["x", "y", "z"]);
    for t in ["x", "z"] {
        let id = s.tracks().iter().find(|tr| tr.display_name == t).unwrap().id;
        s.update_tags(id, t, "Same");
    }
    s.sort_by(SortKey::Artist);
    // Empty artist sorts first; equal artists keep their previous order.
    assert_eq!(order(&s), vec!["y", "x", "z"]);
    let once: Vec<TrackId> = s.tracks().iter().map(|t| t.id).collect();
    s.sort_by(SortKey::Artist);
    let twice: Vec<TrackId> = s.tracks().iter().map(|t| t.id).collect();
    assert_eq!(once, twice);
}

#[test]
fn sort_by_added_at_orders_oldest_first() {
    let mut s = PlaylistStore::new();
    s.add_many(vec![track("new", 30), track("old", 10), track("mid", 20)], &mut rng());
    s.sort_by(SortKey::AddedAt);
    assert_eq!(order(&s), vec!["old", "mid", "new"]);
}

#[test]
fn toggle_shuffle_twice_preserves_repeat_and_current() {
    let mut r = rng();
    let mut s = store_of(&["a", "b", "c", "d", "e"]);
    s.set_current(3);
    let cur = current_id(&s);
    let repeating_before = s.repeating();

    assert!(s.toggle_shuffle(&mut r));
    assert_eq!(s.current_index(), Some(0));
    assert_eq!(current_id(&s), cur);

    assert!(!s.toggle_shuffle(&mut r));
    assert_eq!(current_id(&s), cur);
    assert_eq!(s.repeating(), repeating_before);
}

#[test]
fn repeat_and_shuffle_are_mutually_exclusive() {
    let mut r = rng();
    let mut s = store_of(&["a", "b"]);
    s.toggle_repeat();
    assert!(s.repeating());
    s.toggle_shuffle(&mut r);
    assert!(s.shuffling());
    assert!(!s.repeating());
    s.toggle_repeat();
    assert!(s.repeating());
    assert!(!s.shuffling());
}

#[test]
fn clear_resets_everything() {
    let mut s = store_of(&["a", "b"]);
    s.toggle_repeat();
    s.clear();
    assert!(s.is_empty());
    assert_eq!(s.current_index(), None);
    assert!(!s.repeating());
    assert!(!s.shuffling());
}

#[test]
fn next_at_end_without_repeat_is_stop() {
    let mut s = store_of(&["a", "b", "c"]);
    s.set_current(2);
    assert_eq!(s.next_target(&mut rng()), Some(Advance::Stop));
    assert_eq!(s.current_index(), Some(2));
}

#[test]
fn next_at_end_with_repeat_wraps() {
    let mut s = store_of(&["a", "b", "c"]);
    s.set_current(2);
    s.toggle_repeat();
    assert_eq!(s.next_target(&mut rng()), Some(Advance::To(0)));
}

#[test]
fn next_and_previous_step_in_order() {
    let mut s = store_of(&["a", "b", "c"]);
    let mut r = rng();
    assert_eq!(s.next_target(&mut r), Some(Advance::To(1)));
    assert_eq!(s.previous_target(&mut r), Some(2));
    s.set_current(1);
    assert_eq!(s.previous_target(&mut r), Some(0));
    assert_eq!(PlaylistStore::new().next_target(&mut r), None);
    assert_eq!(PlaylistStore::new().previous_target(&mut r), None);
}

#[test]
fn shuffled_next_never_repeats_current() {
    let mut r = rng();
    let mut s = store_of(&["a", "b", "c", "d"]);
    s.toggle_shuffle(&mut r);
    for cur in 0..4 {
        s.set_current(cur);
        for _ in 0..50 {
            match s.next_target(&mut r) {
                Some(Advance::To(i)) => assert_ne!(i, cur),
                other => panic!("unexpected {other:?}"),
            }
            assert_ne!(s.previous_target(&mut r), Some(cur));
        }
    }
}

#[test]
fn shuffled_single_track_targets_zero() {
    let mut r = rng();
    let mut s = store_of(&["solo"]);
    s.toggle_shuffle(&mut r);
    assert_eq!(s.next_target(&mut r), Some(Advance::To(0)));
    assert_eq!(s.previous_target(&mut r), Some(0));
}

#[test]
fn random_other_is_roughly_uniform() {
    let mut r = rng();
    let mut hits = [0usize; 4];
    for _ in 0..3000 {
        hits[random_other(4, Some(1), &mut r)] += 1;
    }
    assert_eq!(hits[1], 0);
    for (i, h) in hits.iter().enumerate() {
        if i != 1 {
            assert!(*h > 800 && *h < 1200, "index {i} hit {h} times");
        }
    }
}

#[test]
fn reshuffle_pins_current_and_keeps_members() {
    let mut r = rng();
    let tracks: Vec<Track> = (0..6).map(|i| track(&format!("t{i}"), i)).collect();
    let pinned = tracks[4].id;
    let mut ids: Vec<TrackId> = tracks.iter().map(|t| t.id).collect();

    let (out, idx) = reshuffle(tracks, Some(pinned), &mut r);
    assert_eq!(idx, Some(0));
    assert_eq!(out[0].id, pinned);

    let mut got: Vec<TrackId> = out.iter().map(|t| t.id).collect();
    got.sort();
    ids.sort();
    assert_eq!(got, ids);

    let (empty, none) = reshuffle(Vec::new(), None, &mut r);
    assert!(empty.is_empty());
    assert_eq!(none, None);
}

#[test]
fn search_matches_name_title_or_artist_case_insensitively() {
    let mut s = store_of(&["Morning", "evening", "night"]);
    let id = s.tracks()[2].id;
    s.update_tags(id, "Nocturne", "The Owls");

    assert_eq!(s.search("ning"), vec![0, 1]);
    assert_eq!(s.search("OWL"), vec![2]);
    assert_eq!(s.search("noct"), vec![2]);
    assert_eq!(s.search(""), vec![0, 1, 2]);
    assert!(s.search("zzz").is_empty());
}

#[test]
fn update_tags_reports_changes() {
    let mut s = store_of(&["a"]);
    let id = s.tracks()[0].id;
    assert!(s.update_tags(id, "Title", "Artist"));
    assert!(!s.update_tags(id, "Title", "Artist"));
    assert!(!s.update_tags(TrackId::next(), "x", "y"));
}

/// Where `current` should land after removing `index`, worked out from the
/// order before the removal.
fn expected_after_remove(
    before: &[TrackId],
    index: usize,
    current: Option<TrackId>,
) -> Option<TrackId> {
    let removed = before[index];
    if current != Some(removed) {
        return current;
    }
    let rest: Vec<TrackId> = before.iter().copied().filter(|id| *id != removed).collect();
    if rest.is_empty() {
        None
    } else {
        Some(rest[index % rest.len()])
    }
}

#[test]
fn random_edit_sequences_keep_current_on_its_track() {
    use rand::Rng;

    const NAMES: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

    for seed in 0..20 {
        let mut ops = StdRng::seed_from_u64(seed);
        let mut r = rng();
        let mut s = PlaylistStore::new();
        let mut expected: Option<TrackId> = None;

        for step in 0..200 {
            let name = NAMES[ops.gen_range(0..NAMES.len())];
            // A fixed mtime per name makes repeats real duplicates.
            let added = (name.as_bytes()[0] - b'a') as u64;
            match ops.gen_range(0..6) {
                0 => {
                    let was_empty = s.is_empty();
                    match s.add_one(track(name, added), &mut r) {
                        Ok(id) if was_empty => expected = Some(id),
                        Ok(_) => {}
                        Err(e) => assert!(matches!(e, PlayerError::DuplicateTrack(_))),
                    }
                }
                1 => {
                    let count = ops.gen_range(0..4);
                    let batch: Vec<Track> = (0..count)
                        .map(|_| {
                            let n = NAMES[ops.gen_range(0..NAMES.len())];
                            track(n, (n.as_bytes()[0] - b'a') as u64)
                        })
                        .collect();
                    let was_empty = s.is_empty();
                    if s.add_many(batch, &mut r) > 0 && was_empty {
                        // Whichever track was placed first becomes current.
                        expected = Some(s.tracks()[0].id);
                    }
                }
                2 | 3 => {
                    let before: Vec<TrackId> = s.tracks().iter().map(|t| t.id).collect();
                    let index = ops.gen_range(0..before.len() + 1);
                    let removal = s.remove(index);
                    if index < before.len() {
                        let removal = removal.unwrap();
                        assert_eq!(removal.track.id, before[index]);
                        assert_eq!(removal.was_current, expected == Some(before[index]));
                        expected = expected_after_remove(&before, index, expected);
                    } else {
                        assert!(removal.is_none());
                    }
                }
                4 => {
                    let keys = [SortKey::Title, SortKey::Artist, SortKey::AddedAt];
                    s.sort_by(keys[ops.gen_range(0..keys.len())]);
                }
                _ => {
                    s.toggle_shuffle(&mut r);
                }
            }

            assert_eq!(current_id(&s), expected, "seed {seed}, step {step}");
            assert_eq!(s.current_index().is_none(), s.is_empty(), "seed {seed}, step {step}");
        }
    }
}
