//! Playlist store: ordered tracks, the current-index pointer and the
//! repeat/shuffle modes, plus next/previous selection.

mod shuffle;
mod store;

pub use shuffle::{random_other, reshuffle};
pub use store::{Advance, PlaylistStore, Removal, SortKey};

#[cfg(test)]
mod tests;
