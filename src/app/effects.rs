use std::time::Duration;

use crate::app::model::Dialog;
use crate::app::{App, Message, Model, ToastLevel, update};
use crate::image::Submission;
use crate::watcher::DocumentWatcher;

/// Window after our own save during which watch events are ignored.
const SAVE_MUTE: Duration = Duration::from_millis(500);
/// Quiet period before a burst of watch events is reported.
const WATCH_QUIET: Duration = Duration::from_millis(200);

impl App {
    fn start_watcher(model: &Model) -> Option<notify::Result<DocumentWatcher>> {
        let path = model.file_path.as_ref()?;
        Some(DocumentWatcher::new(path, WATCH_QUIET))
    }

    /// Start or stop watching according to `model.watch_enabled`.
    pub(super) fn sync_watcher(model: &mut Model, watcher: &mut Option<DocumentWatcher>) {
        if !model.watch_enabled {
            *watcher = None;
            return;
        }
        match Self::start_watcher(model) {
            Some(Ok(started)) => {
                tracing::info!(path = %started.path().display(), "watch enabled");
                *watcher = Some(started);
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, "file watch unavailable");
                model.watch_enabled = false;
                *watcher = None;
                model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
            }
            None => {
                model.watch_enabled = false;
                model.show_toast(ToastLevel::Warning, "Nothing to watch without a file");
            }
        }
    }

    /// Perform the I/O a message asks for, after `update` has run.
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        watcher: &mut Option<DocumentWatcher>,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleWatch => {
                let requested = model.watch_enabled;
                Self::sync_watcher(model, watcher);
                if !requested {
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                } else if model.watch_enabled {
                    model.show_toast(ToastLevel::Info, "Watching file changes");
                }
            }
            Message::Save => match model.save_to_disk() {
                Ok(path) => {
                    if let Some(watcher) = watcher.as_mut() {
                        watcher.mute_for(SAVE_MUTE);
                    }
                    model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "save failed");
                    let level = if model.file_path.is_some() {
                        ToastLevel::Error
                    } else {
                        ToastLevel::Warning
                    };
                    model.show_toast(level, format!("{err:#}"));
                }
            },
            Message::Reload | Message::FileChanged => match model.read_from_disk() {
                Ok(text) => {
                    if matches!(msg, Message::FileChanged) && text == model.document {
                        return;
                    }
                    *model = update(std::mem::take(model), Message::ExternalValue(text));
                    let note = if matches!(msg, Message::Reload) {
                        "Reloaded"
                    } else {
                        "File changed on disk"
                    };
                    model.show_toast(ToastLevel::Info, note);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "reload failed");
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err:#}"));
                }
            },
            Message::DialogSubmit => Self::submit_image_dialog(model),
            _ => {}
        }
    }

    fn submit_image_dialog(model: &mut Model) {
        let Some(dialog) = model.image_dialog_mut() else {
            return;
        };
        match dialog.submit() {
            Submission::Ready(source) => {
                *model = update(std::mem::take(model), Message::InsertImage(source));
            }
            Submission::Pending => model.show_toast(ToastLevel::Info, "Encoding image..."),
            Submission::Disabled => {}
        }
    }

    /// Finish a pending image encoding. Returns true when the model changed.
    pub(super) fn poll_image_dialog(model: &mut Model) -> bool {
        let Some(Dialog::Image(dialog)) = &mut model.dialog else {
            return false;
        };
        let Some(result) = dialog.poll() else {
            return false;
        };
        let msg = match result {
            Ok(source) => Message::InsertImage(source),
            Err(err) => Message::ImageFailed(err.to_string()),
        };
        *model = update(std::mem::take(model), msg);
        true
    }
}
