use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::color::ColorInput;
use crate::convert::{ConvertOptions, StandardConverter};
use crate::editor::TextArea;
use crate::image::ImageDialog;
use crate::surface::BlockSurface;
use crate::sync::{Mode, ModeSynchronizer};

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(3);

pub type Synchronizer = ModeSynchronizer<BlockSurface, StandardConverter>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// A modal dialog over the editor.
#[derive(Debug)]
pub enum Dialog {
    Image(ImageDialog),
    Color(ColorInput),
}

/// Size of the document value as shown above the raw output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocStats {
    pub chars: usize,
    pub lines: usize,
}

/// The complete application state.
pub struct Model {
    /// Keeps the visual, source and markdown views consistent
    pub sync: Synchronizer,
    /// The document value, as last propagated by the synchronizer
    pub document: String,
    /// Text being edited in source or markdown mode
    pub text_area: TextArea,
    /// First visible line of the text area
    pub text_scroll: usize,
    /// File the document was loaded from; `None` for the built-in sample
    pub file_path: Option<PathBuf>,
    /// Whether the live preview / raw output pane is shown
    pub preview_visible: bool,
    /// Whether the file is watched for external changes
    pub watch_enabled: bool,
    /// Open dialog, if any
    pub dialog: Option<Dialog>,
    /// Whether the document changed since it was loaded or saved
    pub dirty: bool,
    /// Set after a quit attempt with unsaved changes; the next quit proceeds
    pub quit_confirmed: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("mode", &self.sync.mode())
            .field("file_path", &self.file_path)
            .field("dirty", &self.dirty)
            .field("watch_enabled", &self.watch_enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(None, "", ConvertOptions::default())
    }
}

impl Model {
    /// Create a model in visual mode holding `document`.
    pub fn new(file_path: Option<PathBuf>, document: &str, options: ConvertOptions) -> Self {
        let sync = ModeSynchronizer::new(
            BlockSurface::default(),
            StandardConverter,
            options,
            document,
        );
        Self {
            sync,
            document: document.to_string(),
            text_area: TextArea::default(),
            text_scroll: 0,
            file_path,
            preview_visible: true,
            watch_enabled: false,
            dialog: None,
            dirty: false,
            quit_confirmed: false,
            should_quit: false,
            toast: None,
        }
    }

    /// Read `path` and start a model for it.
    pub fn open(path: &Path, options: ConvertOptions) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        tracing::debug!(path = %path.display(), len = text.len(), "document loaded");
        Ok(Self::new(Some(path.to_path_buf()), &text, options))
    }

    pub const fn mode(&self) -> Mode {
        self.sync.mode()
    }

    /// Take a value propagated by the synchronizer.
    pub(super) fn commit(&mut self, value: Option<String>) {
        if let Some(value) = value {
            self.document = value;
            self.dirty = true;
            self.quit_confirmed = false;
        }
    }

    /// Point the text area at the live buffer of the current mode.
    pub(super) fn load_text_area(&mut self) {
        let text = match self.mode() {
            Mode::Visual => return,
            Mode::Raw => self.sync.raw_text().to_string(),
            Mode::Markdown => self.sync.markdown_text().into_owned(),
        };
        self.text_area = TextArea::from_text(&text);
        self.text_scroll = 0;
    }

    pub fn stats(&self) -> DocStats {
        DocStats {
            chars: self.document.chars().count(),
            lines: self.document.split('\n').count(),
        }
    }

    pub fn file_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "sample".to_string(), |s| s.to_string_lossy().to_string())
    }

    pub fn image_dialog_mut(&mut self) -> Option<&mut ImageDialog> {
        match &mut self.dialog {
            Some(Dialog::Image(dialog)) => Some(dialog),
            _ => None,
        }
    }

    /// Keep the text cursor inside a viewport of `height` rows.
    pub fn scroll_text_to_cursor(&mut self, height: usize) {
        let line = self.text_area.cursor().line;
        if line < self.text_scroll {
            self.text_scroll = line;
        } else if height > 0 && line >= self.text_scroll + height {
            self.text_scroll = line + 1 - height;
        }
    }

    /// Write the document value to its file.
    pub(super) fn save_to_disk(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            anyhow::bail!("No file to save to; start with a file argument");
        };
        std::fs::write(&path, &self.document)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.dirty = false;
        tracing::debug!(path = %path.display(), len = self.document.len(), "document saved");
        Ok(path)
    }

    /// Read the current file contents without touching the model.
    pub(super) fn read_from_disk(&self) -> Result<String> {
        let Some(path) = &self.file_path else {
            anyhow::bail!("No file to reload");
        };
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
