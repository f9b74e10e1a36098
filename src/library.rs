//! Local audio library: the `Track` model and helpers that turn files and
//! folders into tracks (with paired `.lrc` lyrics).

mod model;
mod scan;

pub use model::{AudioHandle, Track, TrackId};
pub use scan::{is_lyric_file, load_file, read_lyrics, scan_folder, stem_key};
