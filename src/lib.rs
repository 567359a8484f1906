// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. image::ImageError)
    clippy::module_name_repetitions
)]

//! # Richmark
//!
//! A terminal rich-text editor that keeps one markup document consistent
//! across three editing modes:
//! - **Visual**: a block-based rich-text surface with a formatting toolbar
//! - **Source**: the raw markup text, committed verbatim
//! - **Markdown**: markdown text converted to markup on every keystroke
//!
//! ## Architecture
//!
//! Richmark uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! The [`sync::ModeSynchronizer`] sits underneath and owns the only
//! cross-mode state machine; everything else is an adapter around it.
//!
//! ## Modules
//!
//! - [`sync`]: Mode switching and edit propagation
//! - [`surface`]: The visual editing surface
//! - [`markup`]: Markup tree parsing and serialization
//! - [`convert`]: Markup and markdown conversion
//! - [`image`]: Image insertion dialog and data-URL encoding
//! - [`color`]: Hex colors and the color picker input
//! - [`editor`]: Text area for source and markdown editing
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`highlight`]: Syntax highlighting
//! - [`watcher`]: File watching

pub mod app;
pub mod color;
pub mod config;
pub mod convert;
pub mod editor;
pub mod highlight;
pub mod image;
pub mod markup;
pub mod sample;
pub mod surface;
pub mod sync;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::convert::{ConvertOptions, MarkdownConverter, StandardConverter};
    pub use crate::surface::{BlockSurface, VisualSurface};
    pub use crate::sync::{Mode, ModeState, ModeSynchronizer};
}
