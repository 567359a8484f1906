//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`render`]: Layout of the mode tabs, toolbar, editing and output panes
//! - [`style`]: Theming and colors
//! - markup rendering for the visual surface and the previews

pub mod style;

mod dialogs;
mod render;
mod status;
mod visual;

pub use render::{line_number_width, render, split_main_columns};
pub use visual::{document_lines, surface_lines};

pub const EDITOR_WIDTH_PERCENT: u16 = 55;
pub const PREVIEW_WIDTH_PERCENT: u16 = 45;
