use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::app::Dialog;
use crate::color::{ColorInput, PRESETS};
use crate::image::{DialogField, ImageDialog, ImageTab};

use super::style::{muted_style, tab_style, toolbar_style};

pub fn render_dialog(dialog: &Dialog, frame: &mut Frame, area: Rect) {
    match dialog {
        Dialog::Image(image) => render_image_dialog(image, frame, area),
        Dialog::Color(input) => render_color_dialog(input, frame, area),
    }
}

fn render_image_dialog(dialog: &ImageDialog, frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();

    let mut tabs = Vec::new();
    for tab in [ImageTab::Url, ImageTab::File] {
        tabs.push(Span::styled(
            format!(" {} ", tab.label()),
            tab_style(tab == dialog.tab()),
        ));
        tabs.push(Span::raw(" "));
    }
    lines.push(Line::from(tabs));
    lines.push(Line::default());

    let (source_label, source) = match dialog.tab() {
        ImageTab::Url => ("Image URL", dialog.url()),
        ImageTab::File => ("File path", dialog.file()),
    };
    lines.push(field_line(
        source_label,
        source,
        dialog.focus() == DialogField::Source,
    ));
    lines.push(field_line(
        "Alt text",
        dialog.alt(),
        dialog.focus() == DialogField::Alt,
    ));
    lines.push(Line::default());

    if dialog.is_pending() {
        lines.push(Line::from(Span::styled(
            "Encoding image...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = dialog.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::default());
    }

    lines.push(Line::from(vec![
        Span::styled("[Insert]", toolbar_style(false, dialog.can_insert())),
        Span::styled(
            "  Enter:insert  Tab:field  Shift+Tab:URL/File  Esc:cancel",
            muted_style(),
        ),
    ]));

    render_popup(frame, area, " Insert Image ", lines, 7);
}

fn render_color_dialog(input: &ColorInput, frame: &mut Frame, area: Rect) {
    let mut lines = vec![field_line("Hex", input.text(), true)];
    let preview = input.applied().map_or_else(
        || Span::styled("(none)", muted_style()),
        |color| {
            Span::styled(
                format!("  {color}  "),
                Style::default().bg(Color::Rgb(color.r, color.g, color.b)),
            )
        },
    );
    lines.push(Line::from(vec![Span::raw("Color:    "), preview]));
    if !input.text().is_empty() && !input.is_valid() {
        lines.push(Line::from(Span::styled(
            "Not a hex color; keeping the last valid one",
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::default());
    }

    let mut swatches = Vec::new();
    for (idx, (name, color)) in PRESETS.iter().enumerate() {
        swatches.push(Span::raw(format!("{}", idx + 1)));
        swatches.push(Span::styled(
            "■",
            Style::default().fg(Color::Rgb(color.r, color.g, color.b)),
        ));
        swatches.push(Span::styled(format!("{name} "), muted_style()));
    }
    lines.push(Line::from(swatches));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Enter:apply  Alt+1-7:preset  Del:clear  Esc:cancel",
        muted_style(),
    )));

    render_popup(frame, area, " Text Color ", lines, 6);
}

const POPUP_WIDTH: u16 = 64;
const LABEL_WIDTH: usize = 10;
/// Columns left for a field value after borders, label and cursor.
const VALUE_WIDTH: usize = POPUP_WIDTH as usize - 2 - LABEL_WIDTH - 1;

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!("{label:<width$}", width = LABEL_WIDTH)),
        Span::raw(tail_to_width(value, VALUE_WIDTH).to_string()),
    ];
    if focused {
        spans.push(Span::styled(
            " ",
            Style::default().bg(Color::White).fg(Color::Black),
        ));
    }
    let line = Line::from(spans);
    if focused {
        line.style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        line
    }
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>, height: u16) {
    let popup = centered_popup_rect(POPUP_WIDTH, height + 2, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title.to_string());
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}

/// The longest suffix of `value` that fits in `width` columns, so the end
/// being typed stays visible.
fn tail_to_width(value: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in value.char_indices().rev() {
        used += ch.width().unwrap_or(0);
        if used > width {
            return &value[idx + ch.len_utf8()..];
        }
    }
    value
}
