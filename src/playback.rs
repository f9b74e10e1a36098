//! Playback controller: the state machine that ties the playlist, the media
//! thread, tag extraction and lyric sync into one observable state.

mod controller;
mod resource;
mod state;

pub use controller::{Command, Controller, Effect};
pub use resource::{BoundResource, ResourceMinter};
pub use state::{Artwork, NO_SONG_TITLE, NowPlaying, Phase, PlaybackState};
