//! # Rendering Module
//!
//! Read-only views of a finished dungeon. Only text output lives here;
//! graphical front ends draw from the grid or the wall lines directly.

pub mod text;

pub use text::*;
