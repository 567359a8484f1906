use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::watcher::{DocumentWatcher, FileChange};

/// Poll interval while idle; also bounds watcher and encoder latency.
const IDLE_POLL: Duration = Duration::from_millis(250);
/// Poll interval while an image is being encoded.
const BUSY_POLL: Duration = Duration::from_millis(30);

impl App {
    /// Build the initial model for the configured file or the sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn initial_model(&self) -> Result<Model> {
        let mut model = match &self.file_path {
            Some(path) => Model::open(path, self.options)?,
            None => {
                let mut model = Model::new(None, crate::sample::sample_document(), self.options);
                model.show_toast(
                    ToastLevel::Info,
                    "Sample document loaded; saving needs a file argument",
                );
                model
            }
        };
        model.preview_visible = self.preview_visible;
        model.watch_enabled = self.watch_enabled;
        Ok(update(model, Message::SwitchMode(self.initial_mode)))
    }

    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, the terminal cannot
    /// be initialized, or terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        let mut model = self.initial_model()?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; richmark requires an interactive terminal")?;
        tracing::debug!(mode = ?model.mode(), file = ?self.file_path, "editor started");

        let result = Self::event_loop(&mut terminal, &mut model);

        ratatui::restore();
        result
    }

    fn dispatch(model: &mut Model, watcher: &mut Option<DocumentWatcher>, msg: Message) {
        tracing::trace!(?msg, "message");
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, watcher, &side_msg);
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut watcher = None;
        if model.watch_enabled {
            Self::sync_watcher(model, &mut watcher);
        }
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if Self::poll_image_dialog(model) {
                needs_render = true;
            }

            if model.watch_enabled
                && let Some(change) = watcher.as_mut().and_then(DocumentWatcher::poll_change)
            {
                match change {
                    FileChange::Modified => {
                        Self::dispatch(model, &mut watcher, Message::FileChanged);
                    }
                    FileChange::Removed => model.show_toast(
                        ToastLevel::Warning,
                        "File was removed on disk; Ctrl+S writes it back",
                    ),
                }
                needs_render = true;
            }

            let encoding = matches!(
                &model.dialog,
                Some(crate::app::Dialog::Image(dialog)) if dialog.is_pending()
            );
            let poll = if needs_render {
                Duration::ZERO
            } else if encoding {
                BUSY_POLL
            } else {
                IDLE_POLL
            };

            if event::poll(poll)? {
                // Coalesce key repeat bursts into a single render.
                loop {
                    let event = event::read()?;
                    if matches!(event, event::Event::Resize(..)) {
                        needs_render = true;
                    }
                    if let Some(msg) = Self::handle_event(&event, model) {
                        Self::dispatch(model, &mut watcher, msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
