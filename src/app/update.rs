use crate::app::Model;
use crate::app::model::{Dialog, ToastLevel};
use crate::color::ColorInput;
use crate::editor::{Direction, TextArea};
use crate::image::{ImageDialog, ImageSource};
use crate::surface::SurfaceCommand;
use crate::sync::Mode;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Modes
    /// Make a mode live
    SwitchMode(Mode),
    /// Move to the next mode
    CycleMode,

    // Visual surface
    /// Run an editing command on the visual surface
    Visual(SurfaceCommand),

    // Source / markdown text area
    TextInsert(char),
    TextSplitLine,
    TextDeleteBack,
    TextDeleteForward,
    TextMove(Direction),
    TextHome,
    TextEnd,

    // Dialogs
    OpenImageDialog,
    OpenColorDialog,
    CloseDialog,
    DialogInput(char),
    DialogBackspace,
    /// Move focus between the dialog's fields
    DialogNextField,
    /// Switch the image dialog between URL and file
    DialogToggleTab,
    /// Pick a color swatch by index
    DialogPreset(usize),
    /// Remove the text color from the cursor block
    DialogClearColor,
    /// Press the dialog's confirm button
    DialogSubmit,
    /// An image source is ready to insert
    InsertImage(ImageSource),
    /// Image file encoding failed
    ImageFailed(String),

    // Document
    /// The document value changed outside the editor
    ExternalValue(String),
    /// Save the document
    Save,
    /// Reload the document from its file
    Reload,
    /// The watched file changed on disk
    FileChanged,
    /// Toggle file watching
    ToggleWatch,
    /// Toggle the preview / raw output pane
    TogglePreview,

    /// Quit the application
    Quit,
}

/// Apply a message to the model.
///
/// File I/O, watchers and worker threads live in the effects handler; this
/// function only transforms state.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::SwitchMode(mode) => switch_mode(&mut model, mode),
        Message::CycleMode => {
            let next = model.mode().next();
            switch_mode(&mut model, next);
        }

        Message::Visual(command) => {
            let value = model.sync.apply_visual(|surface| surface.apply(&command));
            model.commit(value);
        }

        Message::TextInsert(ch) => edit_text(&mut model, |area| {
            area.insert_char(ch);
            true
        }),
        Message::TextSplitLine => edit_text(&mut model, |area| {
            area.split_line();
            true
        }),
        Message::TextDeleteBack => edit_text(&mut model, TextArea::delete_back),
        Message::TextDeleteForward => edit_text(&mut model, TextArea::delete_forward),
        Message::TextMove(direction) => model.text_area.move_cursor(direction),
        Message::TextHome => model.text_area.move_home(),
        Message::TextEnd => model.text_area.move_end(),

        Message::OpenImageDialog => {
            if model.mode() == Mode::Visual {
                model.dialog = Some(Dialog::Image(ImageDialog::new()));
            }
        }
        Message::OpenColorDialog => {
            if model.mode() == Mode::Visual {
                let current = model.sync.surface().current_color();
                model.dialog = Some(Dialog::Color(ColorInput::new(current)));
            }
        }
        Message::CloseDialog => {
            // An encoding in flight cannot be cancelled.
            let pending = model
                .image_dialog_mut()
                .is_some_and(|dialog| dialog.is_pending());
            if !pending {
                model.dialog = None;
            }
        }
        Message::DialogInput(ch) => match &mut model.dialog {
            Some(Dialog::Image(dialog)) => dialog.push(ch),
            Some(Dialog::Color(input)) => input.push(ch),
            None => {}
        },
        Message::DialogBackspace => match &mut model.dialog {
            Some(Dialog::Image(dialog)) => dialog.pop(),
            Some(Dialog::Color(input)) => input.pop(),
            None => {}
        },
        Message::DialogNextField => {
            if let Some(dialog) = model.image_dialog_mut() {
                dialog.toggle_focus();
            }
        }
        Message::DialogToggleTab => {
            if let Some(dialog) = model.image_dialog_mut() {
                dialog.toggle_tab();
            }
        }
        Message::DialogPreset(index) => {
            if let Some(Dialog::Color(input)) = &mut model.dialog {
                input.choose_preset(index);
            }
        }
        Message::DialogClearColor => {
            if matches!(model.dialog, Some(Dialog::Color(_))) {
                model.dialog = None;
                let value = model
                    .sync
                    .apply_visual(|surface| surface.apply(&SurfaceCommand::SetColor(None)));
                model.commit(value);
            }
        }
        Message::DialogSubmit => {
            // Image submission spawns work and is handled as an effect.
            if let Some(Dialog::Color(input)) = &model.dialog {
                let color = input.applied();
                model.dialog = None;
                if color.is_some() {
                    let value = model
                        .sync
                        .apply_visual(|surface| surface.apply(&SurfaceCommand::SetColor(color)));
                    model.commit(value);
                }
            }
        }
        Message::InsertImage(source) => {
            model.dialog = None;
            let value = model.sync.insert_image(&source.src, source.alt.as_deref());
            if value.is_some() {
                model.show_toast(ToastLevel::Info, "Image inserted");
            }
            model.commit(value);
        }
        Message::ImageFailed(error) => {
            model.show_toast(ToastLevel::Error, format!("Image failed: {error}"));
        }

        Message::ExternalValue(value) => {
            model.sync.on_external_value_change(&value);
            model.document = value;
            model.dirty = false;
        }
        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        Message::TogglePreview => {
            model.preview_visible = !model.preview_visible;
        }
        Message::Quit => {
            if model.dirty && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes. Ctrl+Q again to quit, Ctrl+S to save",
                );
            } else {
                model.should_quit = true;
            }
        }

        Message::Save | Message::Reload | Message::FileChanged => {}
    }
    model
}

fn switch_mode(model: &mut Model, mode: Mode) {
    if model.dialog.is_some() || mode == model.mode() {
        return;
    }
    let value = model.sync.switch_mode(mode);
    model.commit(value);
    model.load_text_area();
}

/// Apply a text-area edit and report the new text to the live buffer.
fn edit_text(model: &mut Model, edit: impl FnOnce(&mut TextArea) -> bool) {
    if model.mode() == Mode::Visual || !edit(&mut model.text_area) {
        return;
    }
    let text = model.text_area.text();
    let value = match model.mode() {
        Mode::Raw => model.sync.on_raw_edit(&text),
        Mode::Markdown => model.sync.on_markdown_edit(&text),
        Mode::Visual => None,
    };
    model.commit(value);
}
