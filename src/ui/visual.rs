//! Render markup trees as styled terminal lines.

use ratatui::prelude::*;

use crate::color::HexColor;
use crate::markup::{Element, Node};

use super::style::{
    InlineStyle, code_block_style, cursor_marker_style, heading_style, image_style, muted_style,
    quote_style, style_for_inline,
};

const RULE_WIDTH: usize = 24;
const CURSOR_MARKER: &str = "▌ ";
const GUTTER: &str = "  ";

/// Lines for a whole document, one blank line between blocks.
pub fn document_lines(nodes: &[Node]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for node in nodes {
        let block = block_lines(node);
        if block.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.extend(block);
    }
    lines
}

/// Lines for the visual surface with a marker beside the cursor block.
///
/// Also returns the index of the cursor block's first line.
pub fn surface_lines(blocks: &[Node], cursor: usize) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut cursor_line = 0;
    for (idx, node) in blocks.iter().enumerate() {
        let mut block = block_lines(node);
        if block.is_empty() {
            // Empty paragraphs still need a row to hold the cursor.
            block.push(Line::default());
        }
        if idx > 0 {
            lines.push(Line::default());
        }
        if idx == cursor {
            cursor_line = lines.len();
        }
        for (row, line) in block.into_iter().enumerate() {
            let gutter = if idx == cursor && row == 0 {
                Span::styled(CURSOR_MARKER, cursor_marker_style())
            } else {
                Span::raw(GUTTER)
            };
            lines.push(prefixed(gutter, line));
        }
    }
    if blocks.is_empty() {
        lines.push(Line::from(Span::styled(CURSOR_MARKER, cursor_marker_style())));
    }
    (lines, cursor_line)
}

fn block_lines(node: &Node) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    push_block(node, &mut out);
    out
}

fn push_block(node: &Node, out: &mut Vec<Line<'static>>) {
    match node {
        Node::Comment(_) => {}
        Node::Text(_) if node.is_blank_text() => {}
        Node::Text(_) => out.extend(inline_lines(std::slice::from_ref(node), Style::default())),
        Node::Element(el) => push_element(el, out),
    }
}

fn push_element(el: &Element, out: &mut Vec<Line<'static>>) {
    if let Some(level) = el.heading_level() {
        out.extend(inline_lines(&el.children, heading_style(level)));
        return;
    }
    match el.name.as_str() {
        "style" | "script" => {}
        "p" => out.extend(inline_lines(&el.children, Style::default())),
        "ul" | "ol" => push_list(el, out),
        "blockquote" => {
            let bar = Span::styled("│ ", quote_style());
            for line in children_lines(&el.children) {
                out.push(prefixed(bar.clone(), restyle(line, quote_style())));
            }
        }
        "pre" => {
            let text: String = el.children.iter().map(Node::text_content).collect();
            for line in text.trim_end_matches('\n').split('\n') {
                out.push(Line::from(vec![
                    Span::raw(GUTTER),
                    Span::styled(line.replace('\t', "    "), code_block_style()),
                ]));
            }
        }
        "hr" => out.push(Line::from(Span::styled("─".repeat(RULE_WIDTH), muted_style()))),
        "img" => out.push(Line::from(image_span(el))),
        _ => out.extend(children_lines(&el.children)),
    }
}

/// Lay out mixed content: block children stack, runs of inline children
/// become paragraphs.
fn children_lines(children: &[Node]) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    let mut run: Vec<Node> = Vec::new();
    for child in children {
        if child.is_block() {
            flush_inline_run(&mut run, &mut out);
            push_block(child, &mut out);
        } else {
            run.push(child.clone());
        }
    }
    flush_inline_run(&mut run, &mut out);
    out
}

fn flush_inline_run(run: &mut Vec<Node>, out: &mut Vec<Line<'static>>) {
    if run.iter().all(|n| n.is_blank_text() || matches!(n, Node::Comment(_))) {
        run.clear();
        return;
    }
    out.extend(inline_lines(run, Style::default()));
    run.clear();
}

fn push_list(list: &Element, out: &mut Vec<Line<'static>>) {
    let ordered = list.name == "ol";
    let mut number = list
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);
    for item in list.children.iter().filter_map(Node::as_element) {
        if item.name != "li" {
            continue;
        }
        let marker = if ordered {
            format!("{number}. ")
        } else {
            "• ".to_string()
        };
        number += 1;
        let indent = " ".repeat(marker.chars().count());
        let mut item_lines = children_lines(&item.children);
        if item_lines.is_empty() {
            item_lines.push(Line::default());
        }
        for (row, line) in item_lines.into_iter().enumerate() {
            let lead = if row == 0 {
                Span::styled(marker.clone(), muted_style())
            } else {
                Span::raw(indent.clone())
            };
            out.push(prefixed(lead, line));
        }
    }
}

fn image_span(el: &Element) -> Span<'static> {
    let label = el
        .attr("alt")
        .filter(|alt| !alt.trim().is_empty())
        .map_or_else(|| "[Image]".to_string(), |alt| format!("[Image: {alt}]"));
    Span::styled(label, image_style())
}

fn prefixed(lead: Span<'static>, line: Line<'static>) -> Line<'static> {
    let mut spans = Vec::with_capacity(line.spans.len() + 1);
    spans.push(lead);
    spans.extend(line.spans);
    Line::from(spans)
}

fn restyle(line: Line<'static>, base: Style) -> Line<'static> {
    let spans = line
        .spans
        .into_iter()
        .map(|span| {
            let style = base.patch(span.style);
            span.style(style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Collects inline content into lines, collapsing whitespace the way a
/// browser does outside `pre`.
struct InlineWriter {
    base: Style,
    lines: Vec<Vec<Span<'static>>>,
    at_space: bool,
}

impl InlineWriter {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: vec![Vec::new()],
            at_space: true,
        }
    }

    fn text(&mut self, text: &str, inline: InlineStyle) {
        let mut collapsed = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch.is_ascii_whitespace() {
                if !self.at_space {
                    collapsed.push(' ');
                    self.at_space = true;
                }
            } else {
                collapsed.push(if ch == '\u{a0}' { ' ' } else { ch });
                self.at_space = false;
            }
        }
        if !collapsed.is_empty() {
            self.push(Span::styled(collapsed, style_for_inline(self.base, inline)));
        }
    }

    fn push(&mut self, span: Span<'static>) {
        if let Some(line) = self.lines.last_mut() {
            line.push(span);
        }
    }

    fn line_break(&mut self) {
        self.trim_trailing_space();
        self.lines.push(Vec::new());
        self.at_space = true;
    }

    fn trim_trailing_space(&mut self) {
        let Some(line) = self.lines.last_mut() else {
            return;
        };
        if let Some(last) = line.last_mut()
            && last.content.ends_with(' ')
        {
            let trimmed = last.content.trim_end().to_string();
            if trimmed.is_empty() {
                line.pop();
            } else {
                last.content = trimmed.into();
            }
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.trim_trailing_space();
        while self.lines.last().is_some_and(Vec::is_empty) && self.lines.len() > 1 {
            self.lines.pop();
        }
        if self.lines.iter().all(Vec::is_empty) {
            return Vec::new();
        }
        self.lines.into_iter().map(Line::from).collect()
    }
}

fn inline_lines(nodes: &[Node], base: Style) -> Vec<Line<'static>> {
    let mut writer = InlineWriter::new(base);
    for node in nodes {
        walk_inline(node, InlineStyle::default(), &mut writer);
    }
    writer.finish()
}

fn walk_inline(node: &Node, inline: InlineStyle, writer: &mut InlineWriter) {
    let el = match node {
        Node::Text(text) => {
            writer.text(text, inline);
            return;
        }
        Node::Comment(_) => return,
        Node::Element(el) => el,
    };

    let mut inline = inline;
    match el.name.as_str() {
        "br" => {
            writer.line_break();
            return;
        }
        "img" => {
            writer.push(image_span(el));
            writer.at_space = false;
            return;
        }
        "style" | "script" => return,
        "strong" | "b" => inline.strong = true,
        "em" | "i" => inline.emphasis = true,
        "code" => inline.code = true,
        "s" | "del" | "strike" => inline.strikethrough = true,
        "a" => inline.link = true,
        "span" => {
            if let Some(color) = el.attr("style").and_then(HexColor::from_style) {
                inline.fg = Some(color);
            }
        }
        "font" => {
            if let Some(color) = el.attr("color").and_then(|c| c.parse().ok()) {
                inline.fg = Some(color);
            }
        }
        _ => {}
    }
    for child in &el.children {
        walk_inline(child, inline, writer);
    }
}
