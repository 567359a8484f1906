//! Visual editing surface.
//!
//! The mode synchronizer only sees a surface through [`VisualSurface`]:
//! read the current markup, replace it, and insert an image at the cursor.
//! [`BlockSurface`] is the surface the terminal UI edits; it keeps the
//! document as a list of top-level blocks with a block cursor, formatting
//! commands, and its own undo history.

mod block;
mod command;
mod history;

pub use block::BlockSurface;
pub use command::{Format, ListKind, Mark, SurfaceCommand};

/// The narrow contract between the synchronizer and a visual editor.
pub trait VisualSurface {
    /// Current content as markup. Surfaces may normalize what they were given.
    fn content(&self) -> String;
    /// Replace the whole document.
    fn set_content(&mut self, markup: &str);
    /// Insert an image at the cursor.
    fn insert_image(&mut self, src: &str, alt: Option<&str>);
}
