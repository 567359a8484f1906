use crate::color::HexColor;
use crate::markup::{Element, Node, is_block_element, is_void_element, parse, serialize};

use super::VisualSurface;
use super::command::{Format, ListKind, Mark, SurfaceCommand};
use super::history::{EditKind, History, Snapshot};

/// A block-structured visual surface.
///
/// The document is a list of top-level block nodes. The cursor addresses a
/// whole block: typing appends to it, formatting applies to all of its text.
#[derive(Debug)]
pub struct BlockSurface {
    blocks: Vec<Node>,
    cursor: usize,
    history: History,
}

impl Default for BlockSurface {
    fn default() -> Self {
        Self {
            blocks: vec![empty_paragraph()],
            cursor: 0,
            history: History::default(),
        }
    }
}

impl VisualSurface for BlockSurface {
    fn content(&self) -> String {
        serialize(&self.blocks)
    }

    fn set_content(&mut self, markup: &str) {
        self.blocks = normalize(parse(markup));
        self.cursor = self.cursor.min(self.blocks.len() - 1);
        self.history.clear();
    }

    fn insert_image(&mut self, src: &str, alt: Option<&str>) {
        let before = self.snapshot();
        let mut img = Element::new("img", Vec::new()).with_attr("src", src);
        if let Some(alt) = alt.filter(|a| !a.is_empty()) {
            img.set_attr("alt", alt);
        }
        let img = Node::Element(img);

        if self.current_is_empty_paragraph() {
            self.blocks[self.cursor] = img;
        } else {
            self.cursor += 1;
            self.blocks.insert(self.cursor, img);
        }
        self.history.record(before, EditKind::Structure, self.cursor);
    }
}

impl BlockSurface {
    /// Create a surface holding `markup`.
    pub fn new(markup: &str) -> Self {
        let mut surface = Self::default();
        surface.set_content(markup);
        surface
    }

    pub fn blocks(&self) -> &[Node] {
        &self.blocks
    }

    /// Index of the block under the cursor.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply an editing command. Returns true when the content changed.
    pub fn apply(&mut self, command: &SurfaceCommand) -> bool {
        match command {
            SurfaceCommand::Type(ch) => self.type_char(*ch),
            SurfaceCommand::DeleteBack => self.delete_back(),
            SurfaceCommand::SplitBlock => self.split_block(),
            SurfaceCommand::CursorUp => {
                self.cursor = self.cursor.saturating_sub(1);
                self.history.seal();
                false
            }
            SurfaceCommand::CursorDown => {
                self.cursor = (self.cursor + 1).min(self.blocks.len() - 1);
                self.history.seal();
                false
            }
            SurfaceCommand::ToggleHeading(level) => self.toggle_heading(*level),
            SurfaceCommand::ToggleMark(mark) => self.toggle_mark(*mark),
            SurfaceCommand::ToggleList(kind) => self.toggle_list(*kind),
            SurfaceCommand::ToggleBlockquote => self.toggle_blockquote(),
            SurfaceCommand::SetColor(color) => self.set_color(*color),
            SurfaceCommand::Undo => self.restore(true),
            SurfaceCommand::Redo => self.restore(false),
        }
    }

    /// Whether `format` applies to the cursor block.
    pub fn is_active(&self, format: Format) -> bool {
        let Some(block) = self.current_element() else {
            return false;
        };
        match format {
            Format::Heading(level) => block.heading_level() == Some(level),
            Format::List(kind) => block.name == kind.tag(),
            Format::Blockquote => block.name == "blockquote",
            Format::Mark(mark) => {
                let mut any = false;
                let mut all = true;
                visit_containers(block, &mut |el| {
                    if has_content(el) {
                        any = true;
                        all &= single_wrapper(el, |w| mark.matches(&w.name)).is_some();
                    }
                });
                any && all
            }
        }
    }

    /// Text color applied to the cursor block, if uniform.
    pub fn current_color(&self) -> Option<HexColor> {
        let block = self.current_element()?;
        let mut color = None;
        visit_containers(block, &mut |el| {
            if color.is_none() {
                color = single_wrapper(el, is_color_span)
                    .and_then(|span| span.attr("style"))
                    .and_then(HexColor::from_style);
            }
        });
        color
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            blocks: self.blocks.clone(),
            cursor: self.cursor,
        }
    }

    fn current_element(&self) -> Option<&Element> {
        self.blocks.get(self.cursor).and_then(Node::as_element)
    }

    fn current_is_empty_paragraph(&self) -> bool {
        self.current_element()
            .is_some_and(|el| el.name == "p" && !has_content(el))
    }

    fn type_char(&mut self, ch: char) -> bool {
        let before = self.snapshot();
        let accepts_text = self
            .current_element()
            .is_some_and(|el| !is_void_element(&el.name) && !is_raw_text(el));
        if accepts_text {
            if let Some(el) = self.blocks[self.cursor].as_element_mut() {
                append_char(el, ch);
            }
        } else {
            self.cursor += 1;
            self.blocks.insert(
                self.cursor,
                Node::element("p", vec![Node::text(ch.to_string())]),
            );
        }
        self.history.record(before, EditKind::Typing, self.cursor);
        true
    }

    fn delete_back(&mut self) -> bool {
        let before = self.snapshot();
        let removed = self.blocks[self.cursor]
            .as_element_mut()
            .is_some_and(remove_last_char);
        if removed {
            self.history.record(before, EditKind::Deleting, self.cursor);
            return true;
        }
        if self.blocks.len() > 1 {
            self.blocks.remove(self.cursor);
            self.cursor = self.cursor.saturating_sub(1);
            self.history.record(before, EditKind::Structure, self.cursor);
            return true;
        }
        false
    }

    fn split_block(&mut self) -> bool {
        let before = self.snapshot();
        let list = self.blocks[self.cursor]
            .as_element_mut()
            .filter(|el| el.name == "ul" || el.name == "ol");
        if let Some(list) = list {
            list.children.push(Node::element("li", Vec::new()));
        } else {
            self.cursor += 1;
            self.blocks.insert(self.cursor, empty_paragraph());
        }
        self.history.record(before, EditKind::Structure, self.cursor);
        true
    }

    fn toggle_heading(&mut self, level: u8) -> bool {
        let before = self.snapshot();
        let Some(block) = self.blocks[self.cursor].as_element_mut() else {
            return false;
        };
        if !block.is_textblock() {
            return false;
        }
        block.name = if block.heading_level() == Some(level) {
            "p".to_string()
        } else {
            format!("h{level}")
        };
        self.history.record(before, EditKind::Structure, self.cursor);
        true
    }

    fn toggle_mark(&mut self, mark: Mark) -> bool {
        let active = self.is_active(Format::Mark(mark));
        let before = self.snapshot();
        let Some(block) = self.blocks[self.cursor].as_element_mut() else {
            return false;
        };
        let mut changed = false;
        visit_containers_mut(block, &mut |el| {
            if !has_content(el) {
                return;
            }
            let marked = single_wrapper(el, |w| mark.matches(&w.name)).is_some();
            if active && marked {
                unwrap_single(el);
                changed = true;
            } else if !active && !marked {
                wrap_children(el, Element::new(mark.tag(), Vec::new()));
                changed = true;
            }
        });
        if changed {
            self.history.record(before, EditKind::Structure, self.cursor);
        }
        changed
    }

    fn set_color(&mut self, color: Option<HexColor>) -> bool {
        let before = self.snapshot();
        let Some(block) = self.blocks[self.cursor].as_element_mut() else {
            return false;
        };
        let mut changed = false;
        visit_containers_mut(block, &mut |el| {
            if !has_content(el) {
                return;
            }
            if single_wrapper(el, is_color_span).is_some() {
                unwrap_single(el);
                changed = true;
            }
            if let Some(color) = color {
                let span = Element::new("span", Vec::new())
                    .with_attr("style", &format!("color: {color}"));
                wrap_children(el, span);
                changed = true;
            }
        });
        if changed {
            self.history.record(before, EditKind::Structure, self.cursor);
        }
        changed
    }

    fn toggle_list(&mut self, kind: ListKind) -> bool {
        let before = self.snapshot();
        let Some(block) = self.blocks[self.cursor].as_element_mut() else {
            return false;
        };

        if block.name == kind.tag() {
            let items = std::mem::take(&mut block.children);
            let mut replacement = Vec::new();
            for item in items {
                let Node::Element(li) = item else { continue };
                if li.children.iter().any(Node::is_block) {
                    replacement.extend(li.children.into_iter().filter(|n| !n.is_blank_text()));
                } else {
                    replacement.push(Node::element("p", li.children));
                }
            }
            if replacement.is_empty() {
                replacement.push(empty_paragraph());
            }
            self.blocks.splice(self.cursor..=self.cursor, replacement);
        } else if block.name == "ul" || block.name == "ol" {
            block.name = kind.tag().to_string();
        } else if block.is_textblock() {
            let children = std::mem::take(&mut block.children);
            let item = Node::element("li", children);
            self.blocks[self.cursor] = Node::element(kind.tag(), vec![item]);
        } else {
            return false;
        }
        self.history.record(before, EditKind::Structure, self.cursor);
        true
    }

    fn toggle_blockquote(&mut self) -> bool {
        let before = self.snapshot();
        let is_quote = self
            .current_element()
            .is_some_and(|el| el.name == "blockquote");

        if is_quote {
            let Some(quote) = self.blocks[self.cursor].as_element_mut() else {
                return false;
            };
            let inner = normalize(std::mem::take(&mut quote.children));
            self.blocks.splice(self.cursor..=self.cursor, inner);
        } else {
            let block = std::mem::replace(&mut self.blocks[self.cursor], empty_paragraph());
            self.blocks[self.cursor] = Node::element("blockquote", vec![block]);
        }
        self.history.record(before, EditKind::Structure, self.cursor);
        true
    }

    fn restore(&mut self, undo: bool) -> bool {
        let current = self.snapshot();
        let target = if undo {
            self.history.undo(current)
        } else {
            self.history.redo(current)
        };
        let Some(target) = target else {
            return false;
        };
        self.blocks = target.blocks;
        self.cursor = target.cursor.min(self.blocks.len() - 1);
        true
    }
}

fn empty_paragraph() -> Node {
    Node::element("p", Vec::new())
}

fn is_raw_text(el: &Element) -> bool {
    el.name == "style" || el.name == "script"
}

fn is_color_span(el: &Element) -> bool {
    el.name == "span"
        && el
            .attr("style")
            .and_then(HexColor::from_style)
            .is_some()
}

fn has_content(el: &Element) -> bool {
    el.children.iter().any(|n| match n {
        Node::Text(t) => !t.is_empty(),
        Node::Element(_) => true,
        Node::Comment(_) => false,
    })
}

/// Group top-level nodes into blocks.
///
/// Comments and whitespace-only text between blocks are dropped, runs of
/// inline nodes are wrapped in a paragraph, and an empty document becomes a
/// single empty paragraph. Top-level images stay blocks of their own.
fn normalize(nodes: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut run: Vec<Node> = Vec::new();

    let flush = |run: &mut Vec<Node>, blocks: &mut Vec<Node>| {
        if run.iter().any(|n| !n.is_blank_text()) {
            blocks.push(Node::element("p", std::mem::take(run)));
        } else {
            run.clear();
        }
    };

    for node in nodes {
        if matches!(node, Node::Comment(_)) {
            continue;
        }
        let standalone = node.is_block() || node.as_element().is_some_and(|el| el.name == "img");
        if standalone {
            flush(&mut run, &mut blocks);
            blocks.push(node);
        } else {
            run.push(node);
        }
    }
    flush(&mut run, &mut blocks);

    if blocks.is_empty() {
        blocks.push(empty_paragraph());
    }
    blocks
}

/// Visit the elements that hold a block's inline text.
fn visit_containers(el: &Element, f: &mut dyn FnMut(&Element)) {
    if holds_inline(el) {
        f(el);
        return;
    }
    for child in el.children.iter().filter_map(Node::as_element) {
        if is_block_element(&child.name) {
            visit_containers(child, f);
        }
    }
}

fn visit_containers_mut(el: &mut Element, f: &mut dyn FnMut(&mut Element)) {
    if holds_inline(el) {
        f(el);
        return;
    }
    for child in el.children.iter_mut().filter_map(Node::as_element_mut) {
        if is_block_element(&child.name) {
            visit_containers_mut(child, f);
        }
    }
}

fn holds_inline(el: &Element) -> bool {
    if el.is_textblock() {
        return true;
    }
    el.name == "li" && !el.children.iter().any(Node::is_block)
}

/// The only non-blank child of `el`, if it is an element matching `pred`.
fn single_wrapper(el: &Element, pred: impl Fn(&Element) -> bool) -> Option<&Element> {
    let mut meaningful = el.children.iter().filter(|n| !n.is_blank_text());
    let only = meaningful.next()?;
    if meaningful.next().is_some() {
        return None;
    }
    only.as_element().filter(|w| pred(w))
}

fn unwrap_single(el: &mut Element) {
    let children = std::mem::take(&mut el.children);
    for child in children {
        match child {
            Node::Element(wrapper) => el.children.extend(wrapper.children),
            other if other.is_blank_text() => {}
            other => el.children.push(other),
        }
    }
}

fn wrap_children(el: &mut Element, mut wrapper: Element) {
    wrapper.children = std::mem::take(&mut el.children);
    el.children.push(Node::Element(wrapper));
}

fn append_char(el: &mut Element, ch: char) {
    match el.children.last_mut() {
        Some(Node::Text(text)) => {
            text.push(ch);
            return;
        }
        Some(Node::Element(child)) if !is_void_element(&child.name) && !is_raw_text(child) => {
            append_char(child, ch);
            return;
        }
        _ => {}
    }
    el.children.push(Node::text(ch.to_string()));
}

/// Remove the last character of text content, or the last inline void
/// element. Returns false when nothing was left to remove.
fn remove_last_char(el: &mut Element) -> bool {
    while let Some(last) = el.children.last_mut() {
        match last {
            Node::Text(text) => {
                if text.pop().is_some() {
                    if text.is_empty() {
                        el.children.pop();
                    }
                    return true;
                }
                el.children.pop();
            }
            Node::Element(child) if is_void_element(&child.name) => {
                el.children.pop();
                return true;
            }
            Node::Element(child) => {
                if remove_last_char(child) {
                    return true;
                }
                el.children.pop();
            }
            Node::Comment(_) => {
                el.children.pop();
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(surface: &mut BlockSurface, commands: &[SurfaceCommand]) {
        for command in commands {
            surface.apply(command);
        }
    }

    #[test]
    fn test_empty_surface_holds_one_paragraph() {
        let surface = BlockSurface::new("");
        assert_eq!(surface.content(), "<p></p>");
    }

    #[test]
    fn test_set_content_normalizes_top_level() {
        let surface = BlockSurface::new("\n<!-- c -->\n<h1>T</h1>\n loose <b>text</b>\n<img src=\"a.png\">");
        assert_eq!(
            surface.content(),
            "<h1>T</h1><p>\n loose <b>text</b>\n</p><img src=\"a.png\">"
        );
    }

    #[test]
    fn test_unbalanced_markup_is_closed_not_rejected() {
        let surface = BlockSurface::new("<div>");
        assert_eq!(surface.content(), "<div></div>");
    }

    #[test]
    fn test_typing_appends_to_cursor_block() {
        let mut surface = BlockSurface::new("<p>Hel</p>");
        apply_all(
            &mut surface,
            &[SurfaceCommand::Type('l'), SurfaceCommand::Type('o')],
        );
        assert_eq!(surface.content(), "<p>Hello</p>");
    }

    #[test]
    fn test_typing_descends_into_trailing_mark() {
        let mut surface = BlockSurface::new("<p>a <strong>b</strong></p>");
        surface.apply(&SurfaceCommand::Type('c'));
        assert_eq!(surface.content(), "<p>a <strong>bc</strong></p>");
    }

    #[test]
    fn test_typing_after_image_starts_paragraph() {
        let mut surface = BlockSurface::new("<img src=\"a.png\">");
        surface.apply(&SurfaceCommand::Type('x'));
        assert_eq!(surface.content(), "<img src=\"a.png\"><p>x</p>");
        assert_eq!(surface.cursor(), 1);
    }

    #[test]
    fn test_delete_back_then_removes_empty_block() {
        let mut surface = BlockSurface::new("<p>one</p><p>x</p>");
        surface.apply(&SurfaceCommand::CursorDown);
        assert!(surface.apply(&SurfaceCommand::DeleteBack));
        assert_eq!(surface.content(), "<p>one</p><p></p>");
        assert!(surface.apply(&SurfaceCommand::DeleteBack));
        assert_eq!(surface.content(), "<p>one</p>");
        assert_eq!(surface.cursor(), 0);
    }

    #[test]
    fn test_delete_back_on_last_empty_block_is_noop() {
        let mut surface = BlockSurface::new("<p></p>");
        assert!(!surface.apply(&SurfaceCommand::DeleteBack));
    }

    #[test]
    fn test_split_block_inserts_paragraph_or_list_item() {
        let mut surface = BlockSurface::new("<p>a</p>");
        surface.apply(&SurfaceCommand::SplitBlock);
        surface.apply(&SurfaceCommand::Type('b'));
        assert_eq!(surface.content(), "<p>a</p><p>b</p>");

        let mut list = BlockSurface::new("<ul><li>a</li></ul>");
        list.apply(&SurfaceCommand::SplitBlock);
        list.apply(&SurfaceCommand::Type('b'));
        assert_eq!(list.content(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_toggle_heading() {
        let mut surface = BlockSurface::new("<p>Title</p>");
        assert!(surface.apply(&SurfaceCommand::ToggleHeading(2)));
        assert_eq!(surface.content(), "<h2>Title</h2>");
        assert!(surface.is_active(Format::Heading(2)));
        surface.apply(&SurfaceCommand::ToggleHeading(2));
        assert_eq!(surface.content(), "<p>Title</p>");
    }

    #[test]
    fn test_toggle_heading_ignores_lists() {
        let mut surface = BlockSurface::new("<ul><li>a</li></ul>");
        assert!(!surface.apply(&SurfaceCommand::ToggleHeading(2)));
    }

    #[test]
    fn test_toggle_bold_wraps_and_unwraps() {
        let mut surface = BlockSurface::new("<p>Hi <em>there</em></p>");
        surface.apply(&SurfaceCommand::ToggleMark(Mark::Bold));
        assert_eq!(surface.content(), "<p><strong>Hi <em>there</em></strong></p>");
        assert!(surface.is_active(Format::Mark(Mark::Bold)));
        surface.apply(&SurfaceCommand::ToggleMark(Mark::Bold));
        assert_eq!(surface.content(), "<p>Hi <em>there</em></p>");
    }

    #[test]
    fn test_legacy_bold_tag_counts_as_active() {
        let surface = BlockSurface::new("<p><b>Location</b></p>");
        assert!(surface.is_active(Format::Mark(Mark::Bold)));
    }

    #[test]
    fn test_mark_applies_to_every_list_item() {
        let mut surface = BlockSurface::new("<ul><li>a</li><li>b</li></ul>");
        surface.apply(&SurfaceCommand::ToggleMark(Mark::Italic));
        assert_eq!(
            surface.content(),
            "<ul><li><em>a</em></li><li><em>b</em></li></ul>"
        );
    }

    #[test]
    fn test_toggle_list_round_trip() {
        let mut surface = BlockSurface::new("<p>item</p>");
        surface.apply(&SurfaceCommand::ToggleList(ListKind::Bullet));
        assert_eq!(surface.content(), "<ul><li>item</li></ul>");
        assert!(surface.is_active(Format::List(ListKind::Bullet)));

        surface.apply(&SurfaceCommand::ToggleList(ListKind::Ordered));
        assert_eq!(surface.content(), "<ol><li>item</li></ol>");

        surface.apply(&SurfaceCommand::ToggleList(ListKind::Ordered));
        assert_eq!(surface.content(), "<p>item</p>");
    }

    #[test]
    fn test_toggle_blockquote_round_trip() {
        let mut surface = BlockSurface::new("<p>quote</p>");
        surface.apply(&SurfaceCommand::ToggleBlockquote);
        assert_eq!(surface.content(), "<blockquote><p>quote</p></blockquote>");
        assert!(surface.is_active(Format::Blockquote));
        surface.apply(&SurfaceCommand::ToggleBlockquote);
        assert_eq!(surface.content(), "<p>quote</p>");
    }

    #[test]
    fn test_set_and_clear_color() {
        let mut surface = BlockSurface::new("<p>2100-rated</p>");
        let red = HexColor::new(255, 0, 0);
        surface.apply(&SurfaceCommand::SetColor(Some(red)));
        assert_eq!(
            surface.content(),
            "<p><span style=\"color: #ff0000\">2100-rated</span></p>"
        );
        assert_eq!(surface.current_color(), Some(red));

        surface.apply(&SurfaceCommand::SetColor(None));
        assert_eq!(surface.content(), "<p>2100-rated</p>");
        assert_eq!(surface.current_color(), None);
    }

    #[test]
    fn test_recoloring_replaces_existing_span() {
        let mut surface = BlockSurface::new("<p>x</p>");
        surface.apply(&SurfaceCommand::SetColor(Some(HexColor::new(255, 0, 0))));
        surface.apply(&SurfaceCommand::SetColor(Some(HexColor::new(0, 0, 255))));
        assert_eq!(
            surface.content(),
            "<p><span style=\"color: #0000ff\">x</span></p>"
        );
    }

    #[test]
    fn test_undo_redo_typing_run() {
        let mut surface = BlockSurface::new("<p></p>");
        apply_all(
            &mut surface,
            &[
                SurfaceCommand::Type('a'),
                SurfaceCommand::Type('b'),
                SurfaceCommand::ToggleHeading(2),
            ],
        );
        assert_eq!(surface.content(), "<h2>ab</h2>");

        assert!(surface.apply(&SurfaceCommand::Undo));
        assert_eq!(surface.content(), "<p>ab</p>");
        assert!(surface.apply(&SurfaceCommand::Undo));
        assert_eq!(surface.content(), "<p></p>");
        assert!(!surface.can_undo());

        assert!(surface.apply(&SurfaceCommand::Redo));
        assert_eq!(surface.content(), "<p>ab</p>");
        assert!(surface.can_redo());
    }

    #[test]
    fn test_set_content_clears_history() {
        let mut surface = BlockSurface::new("<p></p>");
        surface.apply(&SurfaceCommand::Type('a'));
        surface.set_content("<p>b</p>");
        assert!(!surface.can_undo());
    }

    #[test]
    fn test_insert_image_replaces_empty_paragraph() {
        let mut surface = BlockSurface::new("<p></p>");
        surface.insert_image("https://x/a.png", Some("board"));
        assert_eq!(surface.content(), "<img src=\"https://x/a.png\" alt=\"board\">");
    }

    #[test]
    fn test_insert_image_after_cursor_block() {
        let mut surface = BlockSurface::new("<p>a</p><p>b</p>");
        surface.insert_image("data:image/png;base64,AAAA", None);
        assert_eq!(
            surface.content(),
            "<p>a</p><img src=\"data:image/png;base64,AAAA\"><p>b</p>"
        );
        assert_eq!(surface.cursor(), 1);
        assert!(surface.can_undo());
    }
}
