//! Tag-metadata extraction (title, artist, cover art) off the UI thread.
//!
//! Every request carries the [`SelectionId`] it was issued for; the playback
//! controller compares it against its current selection before applying the
//! outcome.

mod extract;
mod worker;

pub use extract::{Picture, TagInfo, read_tags};
pub use worker::{MetadataOutcome, MetadataRequest, MetadataWorker, SelectionId};
