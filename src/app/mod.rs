//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Dialog, DocStats, Model, Synchronizer, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::convert::ConvertOptions;
use crate::sync::Mode;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: Option<PathBuf>,
    initial_mode: Mode,
    options: ConvertOptions,
    preview_visible: bool,
    watch_enabled: bool,
}

impl App {
    /// Create an application for `file_path`, or the built-in sample when `None`.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            initial_mode: Mode::Visual,
            options: ConvertOptions::default(),
            preview_visible: true,
            watch_enabled: false,
        }
    }

    /// Mode to switch to once the document is loaded.
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Treat single newlines in markdown as line breaks.
    pub const fn with_line_breaks(mut self, significant: bool) -> Self {
        self.options.line_breaks_significant = significant;
        self
    }

    /// Set initial preview pane visibility.
    pub const fn with_preview_visible(mut self, visible: bool) -> Self {
        self.preview_visible = visible;
        self
    }

    /// Enable or disable file watching.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }
}
