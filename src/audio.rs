//! Audio: the gain + 3-band EQ graph manager, its rodio backend, and the
//! media thread that plays the bound source.
//!
//! `AudioGraph` only speaks to a `GraphBackend`, so it can be driven by the
//! rodio implementation at runtime and by a recording fake in tests.

mod backend;
mod eq;
mod graph;
mod media;
mod source;
mod types;

pub use backend::{DspParams, NodeId, RodioGraph};
pub use eq::{Biquad, Coefficients, ThreeBand};
pub use graph::{AudioGraph, GraphBackend, clamp_band_gain, is_valid_band_gain};
pub use media::MediaPlayer;
pub use source::EqSource;
pub use types::*;
