use std::fmt::Write;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "area", "base", "col", "embed", "source", "track",
    "wbr",
];

/// Elements rendered as blocks by the surface and the markdown writer.
const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "blockquote",
    "pre",
    "hr",
    "div",
    "center",
    "section",
    "article",
    "header",
    "footer",
    "table",
    "style",
    "script",
];

/// Elements whose content is raw text, not markup.
pub(super) const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub fn is_block_element(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Decoded text content.
    Text(String),
    Comment(String),
}

impl Node {
    /// Shorthand for an element node without attributes.
    pub fn element(name: &str, children: Vec<Self>) -> Self {
        Self::Element(Element::new(name, children))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub const fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whether this node is rendered as a block.
    pub fn is_block(&self) -> bool {
        self.as_element().is_some_and(|el| is_block_element(&el.name))
    }

    /// Whether this node is text made only of ASCII whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(t) if t.chars().all(|c| c.is_ascii_whitespace()))
    }

    /// Concatenated text content of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(t),
            Self::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
            Self::Comment(_) => {}
        }
    }
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    /// Attributes in source order, values decoded.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str, children: Vec<Node>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
            children,
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        let level = self.name.strip_prefix('h')?.parse::<u8>().ok()?;
        (1..=6).contains(&level).then_some(level)
    }

    /// Whether the element holds inline content directly (paragraphs, headings).
    pub fn is_textblock(&self) -> bool {
        self.name == "p" || self.heading_level().is_some()
    }
}

/// Serialize nodes back to markup text.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, false);
    }
    out
}

fn write_node(out: &mut String, node: &Node, raw_text: bool) {
    match node {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_text(out, text),
        Node::Comment(body) => {
            let _ = write!(out, "<!--{body}-->");
        }
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(out, value);
                out.push('"');
            }
            out.push('>');
            if is_void_element(&el.name) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.name.as_str());
            for child in &el.children {
                write_node(out, child, raw);
            }
            let _ = write!(out, "</{}>", el.name);
        }
    }
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_escapes_text_and_attributes() {
        let link = Element::new("a", vec![Node::text("Q&A <now>")]).with_attr("href", "/x?a=1&b=\"2\"");
        let html = serialize(&[Node::Element(link)]);
        assert_eq!(html, "<a href=\"/x?a=1&amp;b=&quot;2&quot;\">Q&amp;A &lt;now&gt;</a>");
    }

    #[test]
    fn test_serialize_writes_nbsp_as_entity() {
        let html = serialize(&[Node::element("p", vec![Node::text("a\u{a0}b")])]);
        assert_eq!(html, "<p>a&nbsp;b</p>");
    }

    #[test]
    fn test_void_element_has_no_closing_tag() {
        let img = Element::new("img", Vec::new()).with_attr("src", "a.png");
        assert_eq!(serialize(&[Node::Element(img)]), "<img src=\"a.png\">");
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(Element::new("h2", Vec::new()).heading_level(), Some(2));
        assert_eq!(Element::new("h7", Vec::new()).heading_level(), None);
        assert_eq!(Element::new("hr", Vec::new()).heading_level(), None);
    }

    #[test]
    fn test_set_attr_replaces_existing_value() {
        let mut el = Element::new("span", Vec::new()).with_attr("style", "color: red");
        el.set_attr("style", "color: blue");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attr("style"), Some("color: blue"));
    }
}
