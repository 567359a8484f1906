use comrak::{Options, markdown_to_html};

use super::ConvertOptions;

/// Render markdown to markup with comrak.
///
/// Raw HTML in the markdown passes through untouched so markup that has no
/// markdown equivalent survives a trip through the markdown buffer.
pub fn markdown_to_markup(markdown: &str, convert: ConvertOptions) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.render.unsafe_ = true;
    options.render.hardbreaks = convert.line_breaks_significant;

    let html = markdown_to_html(markdown, &options);
    html.trim_ascii().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_emphasis() {
        let html = markdown_to_markup("**Hi**", ConvertOptions::default());
        assert_eq!(html, "<p><strong>Hi</strong></p>");
    }

    #[test]
    fn test_soft_breaks_by_default() {
        let html = markdown_to_markup("one\ntwo", ConvertOptions::default());
        assert!(!html.contains("<br"), "{html}");
    }

    #[test]
    fn test_significant_line_breaks() {
        let html = markdown_to_markup(
            "one\ntwo",
            ConvertOptions {
                line_breaks_significant: true,
            },
        );
        assert!(html.contains("<br"), "{html}");
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = markdown_to_markup("<center>hi</center>", ConvertOptions::default());
        assert!(html.contains("<center>hi</center>"), "{html}");
    }

    #[test]
    fn test_empty_input_yields_empty_markup() {
        assert_eq!(markdown_to_markup("", ConvertOptions::default()), "");
        assert_eq!(markdown_to_markup("  \n", ConvertOptions::default()), "");
    }
}
