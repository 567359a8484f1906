use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::Model;
use crate::highlight::{SourceSyntax, highlight_text};
use crate::markup::parse;
use crate::surface::{Format, ListKind, Mark};
use crate::sync::Mode;

use super::style::{focused_border_style, tab_style, toolbar_style};
use super::{EDITOR_WIDTH_PERCENT, PREVIEW_WIDTH_PERCENT, dialogs, status, visual};

pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
        ])
        .split(area)
}

fn split_halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let toast_active = model.active_toast().is_some();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(u16::from(toast_active)),
            Constraint::Length(1),
        ])
        .split(area);

    render_mode_tabs(model, frame, rows[0]);
    render_toolbar(model, frame, rows[1]);

    if model.preview_visible {
        let columns = split_main_columns(rows[2]);
        render_editing_pane(model, frame, columns[0]);
        render_output_pane(model, frame, columns[1]);
    } else {
        render_editing_pane(model, frame, rows[2]);
    }

    if toast_active {
        status::render_toast_bar(model, frame, rows[3]);
    }
    status::render_status_bar(model, frame, rows[4]);

    if let Some(dialog) = &model.dialog {
        dialogs::render_dialog(dialog, frame, area);
    }
}

fn render_mode_tabs(model: &Model, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (idx, mode) in Mode::ALL.iter().enumerate() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(" F{} {} ", idx + 1, mode.label()),
            tab_style(*mode == model.mode()),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Toolbar entry: label, whether its format applies, whether it can be used.
pub(super) type ToolbarItem = (&'static str, bool, bool);

pub(super) fn toolbar_items(model: &Model) -> Vec<ToolbarItem> {
    let visual = model.mode() == Mode::Visual;
    let surface = model.sync.surface();
    let active = |format| visual && surface.is_active(format);
    vec![
        ("H2", active(Format::Heading(2)), visual),
        ("B", active(Format::Mark(Mark::Bold)), visual),
        ("I", active(Format::Mark(Mark::Italic)), visual),
        ("</>", active(Format::Mark(Mark::Code)), visual),
        ("• List", active(Format::List(ListKind::Bullet)), visual),
        ("1. List", active(Format::List(ListKind::Ordered)), visual),
        ("Quote", active(Format::Blockquote), visual),
        ("Undo", false, visual && surface.can_undo()),
        ("Redo", false, visual && surface.can_redo()),
        ("Image", false, visual),
        ("Color", false, visual),
    ]
}

fn render_toolbar(model: &Model, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (label, active, enabled) in toolbar_items(model) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("[{label}]"), toolbar_style(active, enabled)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_editing_pane(model: &mut Model, frame: &mut Frame, area: Rect) {
    match model.mode() {
        Mode::Visual => render_visual(model, frame, area),
        Mode::Raw => render_text_area(model, frame, area, SourceSyntax::Markup, " HTML Source "),
        Mode::Markdown => {
            let halves = split_halves(area);
            render_text_area(model, frame, halves[0], SourceSyntax::Markdown, " Markdown ");
            let preview = visual::document_lines(&parse(model.sync.markdown_preview()));
            render_lines(frame, halves[1], " Markdown Preview ", preview);
        }
    }
}

fn render_visual(model: &Model, frame: &mut Frame, area: Rect) {
    let surface = model.sync.surface();
    let (lines, cursor_line) = visual::surface_lines(surface.blocks(), surface.cursor());
    let height = usize::from(area.height.saturating_sub(2));
    let scroll = (cursor_line + 1).saturating_sub(height);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border_style(model.dialog.is_none()))
        .title(" Visual ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_text_area(
    model: &mut Model,
    frame: &mut Frame,
    area: Rect,
    syntax: SourceSyntax,
    title: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border_style(true))
        .title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let visible_height = usize::from(inner.height);
    model.scroll_text_to_cursor(visible_height);

    let text = model.text_area.text();
    let highlighted = highlight_text(syntax, &text);
    let total_lines = model.text_area.line_count();
    let gutter_width = usize::from(line_number_width(total_lines));
    let cursor = model.text_area.cursor();
    let start = model.text_scroll;

    let mut content: Vec<Line> = Vec::new();
    for (line_idx, line) in highlighted
        .into_iter()
        .enumerate()
        .skip(start)
        .take(visible_height)
    {
        let line_num = format!("{:>gutter_width$} ", line_idx + 1);
        let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];
        let body = line
            .spans
            .into_iter()
            .map(|span| {
                let content = span.content.replace('\t', " ");
                Span::styled(content, span.style)
            })
            .collect::<Vec<_>>();
        if line_idx == cursor.line {
            spans.extend(with_cursor(body, cursor.col));
        } else {
            spans.extend(body);
        }
        content.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(content), inner);
}

/// Split styled spans so the character at `col` renders as a block cursor.
pub(super) fn with_cursor(spans: Vec<Span<'static>>, col: usize) -> Vec<Span<'static>> {
    let cursor_style = Style::default().bg(Color::White).fg(Color::Black);
    let mut out = Vec::with_capacity(spans.len() + 2);
    let mut seen = 0;
    let mut placed = false;
    for span in spans {
        let len = span.content.chars().count();
        if placed || col >= seen + len {
            seen += len;
            out.push(span);
            continue;
        }
        let offset = col - seen;
        let before: String = span.content.chars().take(offset).collect();
        let at: String = span.content.chars().skip(offset).take(1).collect();
        let after: String = span.content.chars().skip(offset + 1).collect();
        if !before.is_empty() {
            out.push(Span::styled(before, span.style));
        }
        out.push(Span::styled(at, cursor_style));
        if !after.is_empty() {
            out.push(Span::styled(after, span.style));
        }
        placed = true;
        seen += len;
    }
    if !placed {
        out.push(Span::styled(" ", cursor_style));
    }
    out
}

fn render_output_pane(model: &Model, frame: &mut Frame, area: Rect) {
    let halves = split_halves(area);
    let preview = visual::document_lines(&parse(&model.document));
    render_lines(frame, halves[0], " Live HTML Preview ", preview);

    let stats = model.stats();
    let title = format!(
        " Raw HTML Output · {} chars · {} lines ",
        stats.chars, stats.lines
    );
    let raw = highlight_text(SourceSyntax::Markup, &model.document);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    frame.render_widget(Clear, halves[1]);
    frame.render_widget(Paragraph::new(raw).block(block), halves[1]);
}

fn render_lines(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title.to_string());
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
