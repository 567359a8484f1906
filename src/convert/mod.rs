//! Conversion between markup and markdown.
//!
//! - [`MarkdownConverter`]: the conversion seam used by the mode synchronizer
//! - [`StandardConverter`]: comrak for markdown to markup, a tree walk over
//!   [`crate::markup`] for markup to markdown

mod to_markdown;
mod to_markup;

pub use to_markdown::markup_to_markdown;
pub use to_markup::markdown_to_markup;

/// Options for markdown to markup conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Treat single newlines in markdown as hard line breaks.
    pub line_breaks_significant: bool,
}

/// Converts between the markup and markdown representations of a document.
///
/// Implementations are expected to be total: every input produces some
/// output, possibly empty.
pub trait MarkdownConverter {
    fn to_markdown(&self, markup: &str) -> String;
    fn to_markup(&self, markdown: &str, options: ConvertOptions) -> String;
}

/// The default converter pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConverter;

impl MarkdownConverter for StandardConverter {
    fn to_markdown(&self, markup: &str) -> String {
        markup_to_markdown(markup)
    }

    fn to_markup(&self, markdown: &str, options: ConvertOptions) -> String {
        markdown_to_markup(markdown, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_headings_lists_and_emphasis() {
        let converter = StandardConverter;
        let markup = "<h2>Rounds</h2><p><strong>Bold</strong> and <em>soft</em></p>\
                      <ul><li>one</li><li>two</li></ul><ol><li>first</li></ol>";
        let markdown = converter.to_markdown(markup);
        let back = converter.to_markup(&markdown, ConvertOptions::default());

        assert!(back.contains("<h2>Rounds</h2>"), "heading lost: {back}");
        assert!(back.contains("<strong>Bold</strong>"), "strong lost: {back}");
        assert!(back.contains("<em>soft</em>"), "emphasis lost: {back}");
        assert!(back.contains("<ul>") && back.contains("<li>two</li>"), "list lost: {back}");
        assert!(back.contains("<ol>"), "ordered list lost: {back}");
    }

    #[test]
    fn test_round_trip_keeps_links_and_images() {
        let converter = StandardConverter;
        let markup = "<p>See <a href=\"https://example.org\">rules</a></p><p><img src=\"a.png\" alt=\"board\"></p>";
        let back = converter.to_markup(&converter.to_markdown(markup), ConvertOptions::default());
        assert!(back.contains("<a href=\"https://example.org\">rules</a>"), "{back}");
        assert!(back.contains("<img src=\"a.png\" alt=\"board\""), "{back}");
    }
}
