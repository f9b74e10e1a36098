//! Randomized ordering helpers.
//!
//! All randomness goes through a caller-supplied `Rng` so tests can seed it.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::library::{Track, TrackId};

/// Reorder `tracks` uniformly at random, pinning `current` (if present) to
/// the front. Returns the new order and the new current index (`Some(0)`
/// unless the list is empty).
pub fn reshuffle<R: Rng + ?Sized>(
    tracks: Vec<Track>,
    current: Option<TrackId>,
    rng: &mut R,
) -> (Vec<Track>, Option<usize>) {
    let (mut pinned, mut rest): (Vec<Track>, Vec<Track>) = tracks
        .into_iter()
        .partition(|t| Some(t.id) == current);

    // Fisher-Yates over every eligible element.
    rest.shuffle(rng);
    pinned.append(&mut rest);

    let index = if pinned.is_empty() { None } else { Some(0) };
    (pinned, index)
}

/// Pick an index in `0..len` uniformly among those different from `current`.
///
/// With `len <= 1` there is nothing else to choose, so `0` is returned.
pub fn random_other<R: Rng + ?Sized>(len: usize, current: Option<usize>, rng: &mut R) -> usize {
    if len <= 1 {
        return 0;
    }
    match current {
        Some(cur) if cur < len => {
            let pick = rng.gen_range(0..len - 1);
            if pick >= cur { pick + 1 } else { pick }
        }
        _ => rng.gen_range(0..len),
    }
}
