use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use super::{ImageError, encode_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageTab {
    #[default]
    Url,
    File,
}

impl ImageTab {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::File => "File",
        }
    }
}

/// Which text field receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogField {
    /// The URL or file path, depending on the tab.
    #[default]
    Source,
    Alt,
}

/// A resolved image ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub src: String,
    pub alt: Option<String>,
}

/// Outcome of pressing insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A URL was given; insert it now.
    Ready(ImageSource),
    /// A file is being encoded; call [`ImageDialog::poll`] until it resolves.
    Pending,
    /// Nothing to insert.
    Disabled,
}

type EncodeResult = Result<String, ImageError>;

/// State of the insert-image dialog.
#[derive(Debug, Default)]
pub struct ImageDialog {
    tab: ImageTab,
    url: String,
    file: String,
    alt: String,
    focus: DialogField,
    pending: Option<(Receiver<EncodeResult>, String)>,
    failed_file: Option<String>,
    error: Option<String>,
}

impl ImageDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn tab(&self) -> ImageTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: ImageTab) {
        if self.pending.is_none() {
            self.tab = tab;
        }
    }

    pub fn toggle_tab(&mut self) {
        self.set_tab(match self.tab {
            ImageTab::Url => ImageTab::File,
            ImageTab::File => ImageTab::Url,
        });
    }

    pub const fn focus(&self) -> DialogField {
        self.focus
    }

    pub const fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            DialogField::Source => DialogField::Alt,
            DialogField::Alt => DialogField::Source,
        };
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn alt(&self) -> &str {
        &self.alt
    }

    /// The last encoding failure, if the path has not changed since.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn push(&mut self, ch: char) {
        if let Some(field) = self.focused_mut() {
            field.push(ch);
        }
    }

    pub fn pop(&mut self) {
        if let Some(field) = self.focused_mut() {
            field.pop();
        }
    }

    /// Whether the insert action is enabled.
    pub fn can_insert(&self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        match self.tab {
            ImageTab::Url => !self.url.trim().is_empty(),
            ImageTab::File => {
                let file = self.file.trim();
                !file.is_empty() && self.failed_file.as_deref() != Some(file)
            }
        }
    }

    /// Press insert.
    pub fn submit(&mut self) -> Submission {
        if !self.can_insert() {
            return Submission::Disabled;
        }
        match self.tab {
            ImageTab::Url => Submission::Ready(ImageSource {
                src: self.url.clone(),
                alt: self.alt_text(),
            }),
            ImageTab::File => {
                let file = self.file.trim().to_string();
                let path = PathBuf::from(&file);
                let (tx, rx) = mpsc::channel();
                std::thread::spawn(move || {
                    // The dialog may be gone by the time encoding finishes.
                    let _ = tx.send(encode_file(&path));
                });
                tracing::debug!(file = %file, "image encoding started");
                self.pending = Some((rx, file));
                self.error = None;
                Submission::Pending
            }
        }
    }

    /// Check on a pending file encoding.
    ///
    /// Returns `None` while nothing has finished. A failure leaves the dialog
    /// open with insert disabled until the path is edited.
    pub fn poll(&mut self) -> Option<Result<ImageSource, ImageError>> {
        let (rx, _) = self.pending.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ImageError::Disconnected),
        };
        let (_, file) = self.pending.take()?;
        match result {
            Ok(src) => Some(Ok(ImageSource {
                src,
                alt: self.alt_text(),
            })),
            Err(err) => {
                tracing::warn!(file = %file, error = %err, "image encoding failed");
                self.error = Some(err.to_string());
                self.failed_file = Some(file);
                Some(Err(err))
            }
        }
    }

    fn alt_text(&self) -> Option<String> {
        let alt = self.alt.trim();
        (!alt.is_empty()).then(|| alt.to_string())
    }

    fn focused_mut(&mut self) -> Option<&mut String> {
        if self.pending.is_some() {
            return None;
        }
        Some(match (self.focus, self.tab) {
            (DialogField::Alt, _) => &mut self.alt,
            (DialogField::Source, ImageTab::Url) => &mut self.url,
            (DialogField::Source, ImageTab::File) => {
                self.failed_file = None;
                self.error = None;
                &mut self.file
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn type_text(dialog: &mut ImageDialog, text: &str) {
        for ch in text.chars() {
            dialog.push(ch);
        }
    }

    fn wait(dialog: &mut ImageDialog) -> Result<ImageSource, ImageError> {
        for _ in 0..500 {
            if let Some(result) = dialog.poll() {
                return result;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("image encoding did not finish");
    }

    #[test]
    fn test_empty_url_disables_insert() {
        let mut dialog = ImageDialog::new();
        assert!(!dialog.can_insert());
        assert_eq!(dialog.submit(), Submission::Disabled);
        type_text(&mut dialog, "   ");
        assert_eq!(dialog.submit(), Submission::Disabled);
    }

    #[test]
    fn test_empty_file_disables_insert() {
        let mut dialog = ImageDialog::new();
        type_text(&mut dialog, "https://x/a.png");
        dialog.set_tab(ImageTab::File);
        assert!(!dialog.can_insert());
        assert_eq!(dialog.submit(), Submission::Disabled);
    }

    #[test]
    fn test_url_submission_is_ready_with_alt() {
        let mut dialog = ImageDialog::new();
        type_text(&mut dialog, "https://example.com/board.png");
        dialog.toggle_focus();
        type_text(&mut dialog, "Board");
        assert_eq!(
            dialog.submit(),
            Submission::Ready(ImageSource {
                src: "https://example.com/board.png".to_string(),
                alt: Some("Board".to_string()),
            })
        );
    }

    #[test]
    fn test_url_is_inserted_verbatim() {
        let mut dialog = ImageDialog::new();
        type_text(&mut dialog, " https://example.com/a.png ");
        assert!(dialog.can_insert());
        let Submission::Ready(source) = dialog.submit() else {
            panic!("url submission should be ready");
        };
        assert_eq!(source.src, " https://example.com/a.png ");

        let mut blank = ImageDialog::new();
        type_text(&mut blank, "   ");
        assert!(!blank.can_insert());
    }

    #[test]
    fn test_blank_alt_is_none() {
        let mut dialog = ImageDialog::new();
        type_text(&mut dialog, "a.png");
        let Submission::Ready(source) = dialog.submit() else {
            panic!("expected ready submission");
        };
        assert_eq!(source.alt, None);
    }

    #[test]
    fn test_file_submission_encodes_on_worker() {
        let mut file = tempfile::Builder::new()
            .suffix(".gif")
            .tempfile()
            .expect("temp file");
        file.write_all(b"GIF89a").expect("write");

        let mut dialog = ImageDialog::new();
        dialog.toggle_tab();
        type_text(&mut dialog, &file.path().display().to_string());
        assert_eq!(dialog.submit(), Submission::Pending);
        assert!(dialog.is_pending());
        assert!(!dialog.can_insert());
        assert_eq!(dialog.submit(), Submission::Disabled);

        let source = wait(&mut dialog).expect("encoded");
        assert!(source.src.starts_with("data:image/gif;base64,"), "{}", source.src);
        assert!(!dialog.is_pending());
    }

    #[test]
    fn test_failed_encoding_disables_until_path_changes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.png");

        let mut dialog = ImageDialog::new();
        dialog.toggle_tab();
        type_text(&mut dialog, &missing.display().to_string());
        assert_eq!(dialog.submit(), Submission::Pending);
        assert!(wait(&mut dialog).is_err());

        assert!(dialog.error().is_some());
        assert!(!dialog.can_insert());
        dialog.pop();
        assert!(dialog.error().is_none());
        assert!(dialog.can_insert());
    }
}
