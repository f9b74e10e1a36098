//! Application module: exposes the terminal UI model used by `ui` and `runtime`.
//!
//! The `App` model lives in `app::model` and holds the list cursor, the search
//! query, the path prompt and the focused EQ band.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
