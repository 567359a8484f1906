//! Tolerant markup tokenizer and tree builder.

use super::entities::decode_entities;
use super::types::{Element, Node, RAW_TEXT_ELEMENTS, is_block_element, is_void_element};

/// Parse markup into a list of top-level nodes.
///
/// Never fails: a `<` that does not start a well-formed tag is treated as
/// text, close tags without a matching open element are ignored, and
/// elements still open at the end of input are closed there.
pub fn parse(markup: &str) -> Vec<Node> {
    let mut builder = TreeBuilder::default();
    let mut pos = 0;

    while pos < markup.len() {
        let rest = &markup[pos..];

        if let Some(body) = rest.strip_prefix("<!--") {
            match body.find("-->") {
                Some(end) => {
                    builder.push(Node::Comment(body[..end].to_string()));
                    pos += 4 + end + 3;
                }
                None => {
                    builder.push(Node::Comment(body.to_string()));
                    pos = markup.len();
                }
            }
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            // Doctype and processing instructions carry no content.
            pos += rest.find('>').map_or(rest.len(), |i| i + 1);
            continue;
        }

        if rest.starts_with("</") {
            if let Some((name, len)) = parse_close_tag(rest) {
                builder.close(&name);
                pos += len;
                continue;
            }
        } else if rest.starts_with('<') {
            if let Some(tag) = parse_open_tag(rest) {
                pos += tag.len;
                if RAW_TEXT_ELEMENTS.contains(&tag.element.name.as_str()) && !tag.self_closing {
                    pos += builder.raw_text_element(tag.element, &markup[pos..]);
                } else {
                    builder.open(tag.element, tag.self_closing);
                }
                continue;
            }
        }

        // Plain text up to the next tag candidate. A stray `<` is kept as text.
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        builder.text(&decode_entities(&rest[..end]));
        pos += end;
    }

    builder.finish()
}

struct OpenTag {
    element: Element,
    self_closing: bool,
    /// Bytes consumed, including the angle brackets.
    len: usize,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':'
}

fn parse_close_tag(input: &str) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    let mut i = 2;
    if !bytes.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    let name_start = i;
    while bytes.get(i).copied().is_some_and(is_name_byte) {
        i += 1;
    }
    let name = input[name_start..i].to_ascii_lowercase();
    let gt = input[i..].find('>')?;
    Some((name, i + gt + 1))
}

fn parse_open_tag(input: &str) -> Option<OpenTag> {
    let bytes = input.as_bytes();
    let mut i = 1;
    if !bytes.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    let name_start = i;
    while bytes.get(i).copied().is_some_and(is_name_byte) {
        i += 1;
    }
    let mut element = Element::new(&input[name_start..i], Vec::new());

    loop {
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        match *bytes.get(i)? {
            b'>' => {
                return Some(OpenTag {
                    element,
                    self_closing: false,
                    len: i + 1,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(OpenTag {
                    element,
                    self_closing: true,
                    len: i + 2,
                });
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while bytes
            .get(i)
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
        {
            i += 1;
        }
        let attr_name = input[attr_start..i].to_ascii_lowercase();

        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
                i += 1;
            }
            match *bytes.get(i)? {
                quote @ (b'"' | b'\'') => {
                    let close = input[i + 1..].find(char::from(quote))?;
                    value = decode_entities(&input[i + 1..i + 1 + close]);
                    i += close + 2;
                }
                _ => {
                    let start = i;
                    while bytes
                        .get(i)
                        .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>')
                    {
                        i += 1;
                    }
                    value = decode_entities(&input[start..i]);
                }
            }
        }
        if !attr_name.is_empty() {
            element.attrs.push((attr_name, value));
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(top) => top.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = match self.stack.last_mut() {
            Some(top) => &mut top.children,
            None => &mut self.roots,
        };
        if let Some(Node::Text(prev)) = siblings.last_mut() {
            prev.push_str(text);
        } else {
            siblings.push(Node::Text(text.to_string()));
        }
    }

    fn open(&mut self, element: Element, self_closing: bool) {
        self.close_implied_by(&element.name);
        if self_closing || is_void_element(&element.name) {
            self.push(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    /// Attach a `style`/`script` element whose body is taken verbatim.
    /// Returns the bytes consumed from `rest`.
    fn raw_text_element(&mut self, mut element: Element, rest: &str) -> usize {
        let close = format!("</{}", element.name);
        let lower = rest.to_ascii_lowercase();
        let (body_end, consumed) = match lower.find(&close) {
            Some(end) => {
                let gt = rest[end..].find('>').map_or(rest.len() - end, |i| i + 1);
                (end, end + gt)
            }
            None => (rest.len(), rest.len()),
        };
        if body_end > 0 {
            element.children.push(Node::Text(rest[..body_end].to_string()));
        }
        self.close_implied_by(&element.name);
        self.push(Node::Element(element));
        consumed
    }

    fn close_implied_by(&mut self, name: &str) {
        if is_block_element(name) && self.stack.last().is_some_and(|top| top.name == "p") {
            self.pop_one();
        }
        if name == "li" {
            if let Some(idx) = self.stack.iter().rposition(|el| el.name == "li") {
                let nested_list = self.stack[idx + 1..]
                    .iter()
                    .any(|el| el.name == "ul" || el.name == "ol");
                if !nested_list {
                    self.close_to(idx);
                }
            }
        }
    }

    fn close(&mut self, name: &str) {
        if let Some(idx) = self.stack.iter().rposition(|el| el.name == name) {
            self.close_to(idx);
        }
    }

    fn close_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            self.pop_one();
        }
    }

    fn pop_one(&mut self) {
        if let Some(element) = self.stack.pop() {
            self.push(Node::Element(element));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.close_to(0);
        self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::serialize;

    fn first_element(nodes: &[Node]) -> &Element {
        nodes
            .iter()
            .find_map(Node::as_element)
            .expect("expected an element")
    }

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse("<p>Hello <strong>world</strong></p>");
        assert_eq!(nodes.len(), 1);
        let p = first_element(&nodes);
        assert_eq!(p.name, "p");
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.children[0], Node::text("Hello "));
    }

    #[test]
    fn test_parse_attributes_in_all_quote_styles() {
        let nodes = parse(r#"<a href="x.html" title='t' data-x=plain hidden>go</a>"#);
        let a = first_element(&nodes);
        assert_eq!(a.attr("href"), Some("x.html"));
        assert_eq!(a.attr("title"), Some("t"));
        assert_eq!(a.attr("data-x"), Some("plain"));
        assert_eq!(a.attr("hidden"), Some(""));
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        let nodes = parse("<P>x</P>");
        assert_eq!(first_element(&nodes).name, "p");
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let nodes = parse("<p>a<br />b<img src=\"i.png\">c</p><hr/>");
        assert_eq!(nodes.len(), 2);
        let p = first_element(&nodes);
        assert_eq!(p.children.len(), 5);
    }

    #[test]
    fn test_unclosed_elements_close_at_end() {
        let nodes = parse("<div>");
        assert_eq!(serialize(&nodes), "<div></div>");
    }

    #[test]
    fn test_unmatched_close_tag_is_ignored() {
        let nodes = parse("a</span>b");
        assert_eq!(serialize(&nodes), "ab");
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let nodes = parse("1 < 2");
        assert_eq!(nodes, vec![Node::text("1 < 2")]);
    }

    #[test]
    fn test_comments_and_doctype() {
        let nodes = parse("<!DOCTYPE html><!-- note --><p>x</p>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], Node::Comment(" note ".to_string()));
    }

    #[test]
    fn test_style_body_is_raw_text() {
        let nodes = parse("<style type=\"text/css\"><!--td {border: 1px solid #ccc;}--></style><p>x</p>");
        assert_eq!(nodes.len(), 2);
        let style = first_element(&nodes);
        assert_eq!(style.name, "style");
        assert_eq!(
            style.children,
            vec![Node::text("<!--td {border: 1px solid #ccc;}-->")]
        );
        assert_eq!(
            serialize(&nodes),
            "<style type=\"text/css\"><!--td {border: 1px solid #ccc;}--></style><p>x</p>"
        );
    }

    #[test]
    fn test_list_items_close_implicitly() {
        let nodes = parse("<ul><li>one<li>two</ul>");
        let ul = first_element(&nodes);
        assert_eq!(ul.children.len(), 2);
    }

    #[test]
    fn test_nested_list_does_not_close_parent_item() {
        let nodes = parse("<ul><li>one<ul><li>inner</li></ul></li><li>two</li></ul>");
        let ul = first_element(&nodes);
        assert_eq!(ul.children.len(), 2);
    }

    #[test]
    fn test_block_closes_open_paragraph() {
        let nodes = parse("<p>one<h2>two</h2>");
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_entities_decoded_in_text_and_attributes() {
        let nodes = parse("<a title=\"a&amp;b\">x&nbsp;y</a>");
        let a = first_element(&nodes);
        assert_eq!(a.attr("title"), Some("a&b"));
        assert_eq!(a.children[0], Node::text("x\u{a0}y"));
    }

    #[test]
    fn test_unterminated_quote_falls_back_to_text() {
        let nodes = parse("<a href=\"oops>x");
        assert!(matches!(nodes.first(), Some(Node::Text(_))));
    }
}
