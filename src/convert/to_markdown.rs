use std::sync::LazyLock;

use regex::Regex;

use crate::markup::{Element, Node, parse};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n]+").expect("whitespace pattern"));

/// Render markup as markdown.
///
/// Markup with no markdown equivalent degrades to its text content:
/// unknown containers are unwrapped, `style`/`script` bodies and comments
/// are dropped.
pub fn markup_to_markdown(markup: &str) -> String {
    let nodes = parse(markup);
    let mut blocks = Vec::new();
    render_blocks(&nodes, &mut blocks);
    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_blocks(nodes: &[Node], out: &mut Vec<String>) {
    let mut inline_run: Vec<&Node> = Vec::new();
    for node in nodes {
        match node {
            Node::Comment(_) => {}
            Node::Element(el) if node.is_block() => {
                flush_inline(&mut inline_run, out);
                render_block(el, out);
            }
            _ => inline_run.push(node),
        }
    }
    flush_inline(&mut inline_run, out);
}

fn flush_inline(run: &mut Vec<&Node>, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let mut text = String::new();
    for node in run.drain(..) {
        render_inline(node, &mut text);
    }
    let text = text.trim_ascii();
    if !text.is_empty() {
        out.push(escape_block_start(text));
    }
}

fn render_block(el: &Element, out: &mut Vec<String>) {
    if let Some(level) = el.heading_level() {
        let text = inline_children(&el.children);
        let text = text.trim_ascii();
        if !text.is_empty() {
            out.push(format!("{} {text}", "#".repeat(usize::from(level))));
        }
        return;
    }

    match el.name.as_str() {
        "p" => {
            let text = inline_children(&el.children);
            let text = text.trim_ascii();
            if !text.is_empty() {
                out.push(escape_block_start(text));
            }
        }
        "ul" | "ol" => {
            let list = render_list(el);
            if !list.is_empty() {
                out.push(list);
            }
        }
        "li" => {
            // A list item outside of any list still reads as one.
            let wrapper = Element::new("ul", vec![Node::Element(el.clone())]);
            out.push(render_list(&wrapper));
        }
        "blockquote" => {
            let mut inner = Vec::new();
            render_blocks(&el.children, &mut inner);
            if !inner.is_empty() {
                out.push(prefix_lines(&inner.join("\n\n"), "> ", ">"));
            }
        }
        "pre" => out.push(render_code_block(el)),
        "hr" => out.push("---".to_string()),
        "style" | "script" => {}
        _ => render_blocks(&el.children, out),
    }
}

fn render_list(list: &Element) -> String {
    let ordered = list.name == "ol";
    let mut number = list
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let mut items = Vec::new();

    for child in &list.children {
        let Some(item) = child.as_element() else {
            continue;
        };
        let mut inner = Vec::new();
        if item.name == "li" {
            render_blocks(&item.children, &mut inner);
        } else {
            render_block(item, &mut inner);
        }

        let marker = if ordered {
            format!("{number}. ")
        } else {
            "- ".to_string()
        };
        number += 1;

        let body = inner.join("\n");
        let indent = " ".repeat(marker.len());
        let mut lines = body.lines();
        let first = lines.next().unwrap_or_default();
        let mut rendered = format!("{marker}{first}").trim_end().to_string();
        for line in lines {
            rendered.push('\n');
            if !line.is_empty() {
                rendered.push_str(&indent);
                rendered.push_str(line);
            }
        }
        items.push(rendered);
    }

    items.join("\n")
}

fn render_code_block(pre: &Element) -> String {
    let language = pre
        .children
        .iter()
        .filter_map(Node::as_element)
        .find(|el| el.name == "code")
        .and_then(|code| code.attr("class"))
        .and_then(|class| {
            class
                .split_ascii_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
        })
        .unwrap_or_default()
        .to_string();
    let code = Node::Element(pre.clone()).text_content();
    let code = code.strip_suffix('\n').unwrap_or(&code);
    format!("```{language}\n{code}\n```")
}

fn inline_children(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_inline(node, &mut out);
    }
    out
}

fn render_inline(node: &Node, out: &mut String) {
    let el = match node {
        Node::Text(text) => {
            out.push_str(&escape_text(&WHITESPACE_RUN.replace_all(text, " ")));
            return;
        }
        Node::Comment(_) => return,
        Node::Element(el) => el,
    };

    match el.name.as_str() {
        "strong" | "b" => wrap_inline(out, "**", &el.children),
        "em" | "i" => wrap_inline(out, "*", &el.children),
        "s" | "del" | "strike" => wrap_inline(out, "~~", &el.children),
        "code" => {
            let code = Node::Element(el.clone()).text_content();
            let fence = if code.contains('`') { "``" } else { "`" };
            out.push_str(fence);
            out.push_str(&code);
            out.push_str(fence);
        }
        "a" => {
            let text = inline_children(&el.children);
            match el.attr("href") {
                Some(href) => {
                    out.push('[');
                    out.push_str(text.trim_ascii());
                    out.push_str("](");
                    out.push_str(href);
                    out.push(')');
                }
                None => out.push_str(&text),
            }
        }
        "img" => {
            let src = el.attr("src").unwrap_or_default();
            let alt = el.attr("alt").unwrap_or_default();
            if src.contains([' ', '(', ')']) {
                out.push_str(&format!("![{alt}](<{src}>)"));
            } else {
                out.push_str(&format!("![{alt}]({src})"));
            }
        }
        "br" => out.push_str("\\\n"),
        "style" | "script" => {}
        _ => {
            for child in &el.children {
                render_inline(child, out);
            }
        }
    }
}

/// Wrap rendered children in an emphasis marker, keeping surrounding
/// whitespace outside the delimiters so the emphasis still parses.
fn wrap_inline(out: &mut String, marker: &str, children: &[Node]) {
    let inner = inline_children(children);
    let core = inner.trim_ascii();
    if core.is_empty() {
        out.push_str(&inner);
        return;
    }
    let lead = &inner[..inner.len() - inner.trim_ascii_start().len()];
    let trail = &inner[inner.trim_ascii_end().len()..];
    out.push_str(lead);
    out.push_str(marker);
    out.push_str(core);
    out.push_str(marker);
    out.push_str(trail);
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '[' | ']' | '~' | '<') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn escape_block_start(text: &str) -> String {
    if text.starts_with(['#', '>']) {
        format!("\\{text}")
    } else {
        text.to_string()
    }
}

fn prefix_lines(text: &str, prefix: &str, blank_prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                blank_prefix.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
