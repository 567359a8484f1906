use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::sync::Mode;

pub fn status_text(model: &Model) -> String {
    let dirty_indicator = if model.dirty { " [modified]" } else { "" };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let position = match model.mode() {
        Mode::Visual => String::new(),
        Mode::Raw | Mode::Markdown => {
            let c = model.text_area.cursor();
            format!("  Ln {}, Col {}", c.line + 1, c.col + 1)
        }
    };
    let hints = match model.mode() {
        Mode::Visual => "Alt+h/b/i/c/u/o/q:format  Alt+g:image  Alt+k:color",
        Mode::Raw | Mode::Markdown => "F1-F3:mode",
    };
    format!(
        " {}{}{}  {}{}  {}  Ctrl+S:save  Ctrl+P:preview  Ctrl+Q:quit",
        model.file_name(),
        dirty_indicator,
        watch_indicator,
        model.mode().label().to_uppercase(),
        position,
        hints
    )
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let status_bar = Paragraph::new(status_text(model))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
