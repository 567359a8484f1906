//! Built-in document shown when no file is given.

const FLYER: &str = include_str!("sample.html");

/// A chess tournament flyer with headings, lists, links, inline colours and
/// some legacy markup (`center`, `b`, a `style` block).
pub fn sample_document() -> &'static str {
    FLYER.trim_end()
}
