use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Dialog, Message, Model};
use crate::editor::Direction;
use crate::surface::{ListKind, Mark, SurfaceCommand};
use crate::sync::Mode;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('q') {
            return Some(Message::Quit);
        }
        if let Some(dialog) = &model.dialog {
            return Self::handle_dialog_key(key, dialog);
        }

        if ctrl {
            let msg = match key.code {
                KeyCode::Char('s') => Message::Save,
                KeyCode::Char('r') => Message::Reload,
                KeyCode::Char('p') => Message::TogglePreview,
                KeyCode::Char('w') => Message::ToggleWatch,
                KeyCode::Char('z') if model.mode() == Mode::Visual => {
                    Message::Visual(SurfaceCommand::Undo)
                }
                KeyCode::Char('y') if model.mode() == Mode::Visual => {
                    Message::Visual(SurfaceCommand::Redo)
                }
                _ => return None,
            };
            return Some(msg);
        }

        match key.code {
            KeyCode::F(1) => return Some(Message::SwitchMode(Mode::Visual)),
            KeyCode::F(2) => return Some(Message::SwitchMode(Mode::Raw)),
            KeyCode::F(3) => return Some(Message::SwitchMode(Mode::Markdown)),
            KeyCode::F(4) => return Some(Message::CycleMode),
            _ => {}
        }

        match model.mode() {
            Mode::Visual => Self::handle_visual_key(key),
            Mode::Raw | Mode::Markdown => Self::handle_text_key(key),
        }
    }

    fn handle_visual_key(key: KeyEvent) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::ALT) {
            let command = match key.code {
                KeyCode::Char('h') => SurfaceCommand::ToggleHeading(2),
                KeyCode::Char('b') => SurfaceCommand::ToggleMark(Mark::Bold),
                KeyCode::Char('i') => SurfaceCommand::ToggleMark(Mark::Italic),
                KeyCode::Char('c') => SurfaceCommand::ToggleMark(Mark::Code),
                KeyCode::Char('u') => SurfaceCommand::ToggleList(ListKind::Bullet),
                KeyCode::Char('o') => SurfaceCommand::ToggleList(ListKind::Ordered),
                KeyCode::Char('q') => SurfaceCommand::ToggleBlockquote,
                KeyCode::Char('g') => return Some(Message::OpenImageDialog),
                KeyCode::Char('k') => return Some(Message::OpenColorDialog),
                _ => return None,
            };
            return Some(Message::Visual(command));
        }

        let command = match key.code {
            KeyCode::Char(ch) => SurfaceCommand::Type(ch),
            KeyCode::Enter => SurfaceCommand::SplitBlock,
            KeyCode::Backspace => SurfaceCommand::DeleteBack,
            KeyCode::Up => SurfaceCommand::CursorUp,
            KeyCode::Down => SurfaceCommand::CursorDown,
            _ => return None,
        };
        Some(Message::Visual(command))
    }

    fn handle_text_key(key: KeyEvent) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::ALT) {
            return None;
        }
        let msg = match key.code {
            KeyCode::Char(ch) => Message::TextInsert(ch),
            KeyCode::Tab => Message::TextInsert('\t'),
            KeyCode::Enter => Message::TextSplitLine,
            KeyCode::Backspace => Message::TextDeleteBack,
            KeyCode::Delete => Message::TextDeleteForward,
            KeyCode::Left => Message::TextMove(Direction::Left),
            KeyCode::Right => Message::TextMove(Direction::Right),
            KeyCode::Up => Message::TextMove(Direction::Up),
            KeyCode::Down => Message::TextMove(Direction::Down),
            KeyCode::Home => Message::TextHome,
            KeyCode::End => Message::TextEnd,
            _ => return None,
        };
        Some(msg)
    }

    fn handle_dialog_key(key: KeyEvent, dialog: &Dialog) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::ALT) {
            return match (key.code, dialog) {
                (KeyCode::Char(ch @ '1'..='9'), Dialog::Color(_)) => {
                    Some(Message::DialogPreset(usize::from(ch as u8 - b'1')))
                }
                _ => None,
            };
        }
        let msg = match (key.code, dialog) {
            (KeyCode::Esc, _) => Message::CloseDialog,
            (KeyCode::Enter, _) => Message::DialogSubmit,
            (KeyCode::Backspace, _) => Message::DialogBackspace,
            (KeyCode::Char(ch), _) => Message::DialogInput(ch),
            (KeyCode::Tab, Dialog::Image(_)) => Message::DialogNextField,
            (KeyCode::BackTab, Dialog::Image(_)) => Message::DialogToggleTab,
            (KeyCode::Delete, Dialog::Color(_)) => Message::DialogClearColor,
            _ => return None,
        };
        Some(msg)
    }
}
