//! Rope-backed text editing for the source and markdown modes.

mod text_area;

pub use text_area::{Cursor, Direction, TextArea};
