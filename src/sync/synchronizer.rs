use std::borrow::Cow;

use crate::convert::{ConvertOptions, MarkdownConverter};
use crate::surface::VisualSurface;

use super::{Mode, ModeState};

/// Keeps a markup document consistent across three editing surfaces.
///
/// The owner holds the document value. Every operation that changes it
/// returns `Some(new_value)`; `None` means the operation had no effect in
/// the current mode.
#[derive(Debug)]
pub struct ModeSynchronizer<S, C> {
    surface: S,
    converter: C,
    options: ConvertOptions,
    state: ModeState,
    /// Last document value seen, either supplied by the owner or propagated to it.
    committed: String,
}

impl<S: VisualSurface, C: MarkdownConverter> ModeSynchronizer<S, C> {
    /// Start in visual mode with `initial` loaded into the surface.
    pub fn new(mut surface: S, converter: C, options: ConvertOptions, initial: &str) -> Self {
        surface.set_content(initial);
        Self {
            surface,
            converter,
            options,
            state: ModeState::Visual,
            committed: initial.to_string(),
        }
    }

    pub const fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub const fn state(&self) -> &ModeState {
        &self.state
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn options(&self) -> ConvertOptions {
        self.options
    }

    /// The last document value committed through this synchronizer.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Raw markup text: the live buffer in raw mode, else the committed value.
    pub fn raw_text(&self) -> &str {
        match &self.state {
            ModeState::Raw { buffer } => buffer,
            _ => &self.committed,
        }
    }

    /// Markdown text: the live buffer in markdown mode, else derived from the committed value.
    pub fn markdown_text(&self) -> Cow<'_, str> {
        match &self.state {
            ModeState::Markdown { buffer, .. } => Cow::Borrowed(buffer),
            _ => Cow::Owned(self.converter.to_markdown(&self.committed)),
        }
    }

    /// Rendered markdown preview: live in markdown mode, else the committed value.
    pub fn markdown_preview(&self) -> &str {
        match &self.state {
            ModeState::Markdown { preview, .. } => preview,
            _ => &self.committed,
        }
    }

    /// The owner supplied a new document value from outside.
    ///
    /// A live raw or markdown buffer stays authoritative and is not
    /// overwritten. In visual mode the surface is only reset when its content
    /// actually differs, so an echo of our own edit does not re-render.
    pub fn on_external_value_change(&mut self, value: &str) {
        tracing::debug!(mode = ?self.mode(), len = value.len(), "external value change");
        self.committed = value.to_string();
        if self.mode() == Mode::Visual && self.surface.content() != value {
            self.surface.set_content(value);
        }
    }

    /// The visual surface reported new content.
    pub fn on_visual_edit(&mut self, markup: String) -> Option<String> {
        if self.mode() != Mode::Visual {
            return None;
        }
        tracing::trace!(len = markup.len(), "visual edit");
        self.committed.clone_from(&markup);
        Some(markup)
    }

    /// Run an editing closure against the surface in visual mode.
    ///
    /// The closure returns whether it changed the content; if so, this acts
    /// as the surface's change notification.
    pub fn apply_visual(&mut self, edit: impl FnOnce(&mut S) -> bool) -> Option<String> {
        if self.mode() != Mode::Visual {
            return None;
        }
        if !edit(&mut self.surface) {
            return None;
        }
        let content = self.surface.content();
        self.on_visual_edit(content)
    }

    /// Insert an image at the surface cursor.
    pub fn insert_image(&mut self, src: &str, alt: Option<&str>) -> Option<String> {
        self.apply_visual(|surface| {
            surface.insert_image(src, alt);
            true
        })
    }

    /// The raw buffer was edited. The text is committed verbatim, unvalidated.
    pub fn on_raw_edit(&mut self, text: &str) -> Option<String> {
        let ModeState::Raw { buffer } = &mut self.state else {
            return None;
        };
        tracing::trace!(len = text.len(), "raw edit");
        text.clone_into(buffer);
        text.clone_into(&mut self.committed);
        Some(text.to_string())
    }

    /// The markdown buffer was edited.
    pub fn on_markdown_edit(&mut self, text: &str) -> Option<String> {
        let ModeState::Markdown { preview, .. } = &self.state else {
            return None;
        };
        let markup = convert_or_retain(&self.converter, text, self.options, preview);
        tracing::trace!(len = text.len(), "markdown edit");
        self.state = ModeState::Markdown {
            buffer: text.to_string(),
            preview: markup.clone(),
        };
        self.committed.clone_from(&markup);
        Some(markup)
    }

    /// Make `next` the live mode, committing the outgoing buffer first.
    pub fn switch_mode(&mut self, next: Mode) -> Option<String> {
        if next == self.mode() {
            return None;
        }
        tracing::debug!(from = ?self.mode(), to = ?next, "switch mode");

        let state = std::mem::replace(&mut self.state, ModeState::Visual);
        let propagated = match state {
            ModeState::Visual => None,
            ModeState::Raw { buffer } => {
                self.surface.set_content(&buffer);
                // An external value may have replaced the committed markup
                // while the buffer kept its own edits.
                (buffer != self.committed).then(|| {
                    self.committed.clone_from(&buffer);
                    buffer
                })
            }
            ModeState::Markdown { buffer, .. } => {
                let prior = self.surface.content();
                let markup = convert_or_retain(&self.converter, &buffer, self.options, &prior);
                self.surface.set_content(&markup);
                self.committed.clone_from(&markup);
                Some(markup)
            }
        };

        self.state = match next {
            Mode::Visual => ModeState::Visual,
            Mode::Raw => ModeState::Raw {
                buffer: self.surface.content(),
            },
            Mode::Markdown => {
                let content = self.surface.content();
                let buffer = self.converter.to_markdown(&content);
                let preview = convert_or_retain(&self.converter, &buffer, self.options, &content);
                ModeState::Markdown { buffer, preview }
            }
        };

        propagated
    }
}

/// Convert markdown, keeping `prior` when the conversion yields nothing.
fn convert_or_retain<C: MarkdownConverter>(
    converter: &C,
    markdown: &str,
    options: ConvertOptions,
    prior: &str,
) -> String {
    let markup = converter.to_markup(markdown, options);
    if markup.trim().is_empty() {
        tracing::warn!(
            markdown_len = markdown.len(),
            "markdown converted to empty markup; keeping previous value"
        );
        return prior.to_string();
    }
    markup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::StandardConverter;
    use crate::surface::{BlockSurface, Mark, SurfaceCommand};

    /// Surface that stores content verbatim and counts resets.
    #[derive(Debug, Default)]
    struct RecordingSurface {
        content: String,
        sets: usize,
        images: Vec<(String, Option<String>)>,
    }

    impl VisualSurface for RecordingSurface {
        fn content(&self) -> String {
            self.content.clone()
        }

        fn set_content(&mut self, markup: &str) {
            self.content = markup.to_string();
            self.sets += 1;
        }

        fn insert_image(&mut self, src: &str, alt: Option<&str>) {
            self.images.push((src.to_string(), alt.map(str::to_string)));
            self.content.push_str(&format!("<img src=\"{src}\">"));
        }
    }

    /// Converter whose markdown output never renders.
    struct BlankConverter;

    impl MarkdownConverter for BlankConverter {
        fn to_markdown(&self, markup: &str) -> String {
            markup.to_string()
        }

        fn to_markup(&self, _markdown: &str, _options: ConvertOptions) -> String {
            String::new()
        }
    }

    fn recording(initial: &str) -> ModeSynchronizer<RecordingSurface, StandardConverter> {
        ModeSynchronizer::new(
            RecordingSurface::default(),
            StandardConverter,
            ConvertOptions::default(),
            initial,
        )
    }

    fn blocks(initial: &str) -> ModeSynchronizer<BlockSurface, StandardConverter> {
        ModeSynchronizer::new(
            BlockSurface::default(),
            StandardConverter,
            ConvertOptions::default(),
            initial,
        )
    }

    #[test]
    fn test_starts_in_visual_mode_with_initial_content() {
        let sync = recording("<p>Hello</p>");
        assert_eq!(sync.mode(), Mode::Visual);
        assert_eq!(sync.surface().content(), "<p>Hello</p>");
        assert_eq!(sync.raw_text(), "<p>Hello</p>");
    }

    #[test]
    fn test_switch_to_same_mode_is_noop() {
        let mut sync = recording("<p>a</p>");
        assert_eq!(sync.switch_mode(Mode::Visual), None);
        assert_eq!(sync.surface().sets, 1);
    }

    #[test]
    fn test_visual_raw_visual_round_trip_keeps_value() {
        let mut sync = blocks("<h1>Title</h1><p>Body</p>");
        let before = sync.surface().content();
        assert_eq!(sync.switch_mode(Mode::Raw), None);
        assert_eq!(sync.raw_text(), before);
        assert_eq!(sync.switch_mode(Mode::Visual), None);
        assert_eq!(sync.surface().content(), before);
    }

    #[test]
    fn test_raw_edit_propagates_verbatim() {
        let mut sync = recording("<p>a</p>");
        sync.switch_mode(Mode::Raw);
        assert_eq!(sync.on_raw_edit("<div>"), Some("<div>".to_string()));
        assert_eq!(sync.raw_text(), "<div>");
        assert_eq!(sync.committed(), "<div>");
    }

    #[test]
    fn test_raw_commit_pushes_buffer_into_surface() {
        let mut sync = recording("<p>a</p>");
        sync.switch_mode(Mode::Raw);
        sync.on_raw_edit("<p>b</p>");
        assert_eq!(sync.switch_mode(Mode::Visual), None);
        assert_eq!(sync.surface().content(), "<p>b</p>");
    }

    #[test]
    fn test_edits_are_ignored_outside_their_mode() {
        let mut sync = recording("<p>a</p>");
        assert_eq!(sync.on_raw_edit("x"), None);
        assert_eq!(sync.on_markdown_edit("x"), None);
        sync.switch_mode(Mode::Raw);
        assert_eq!(sync.on_visual_edit("<p>x</p>".to_string()), None);
        assert_eq!(sync.apply_visual(|_| true), None);
    }

    #[test]
    fn test_visual_edit_propagates_in_visual_mode() {
        let mut sync = recording("<p>a</p>");
        assert_eq!(
            sync.on_visual_edit("<p>ab</p>".to_string()),
            Some("<p>ab</p>".to_string())
        );
        assert_eq!(sync.committed(), "<p>ab</p>");
    }

    #[test]
    fn test_apply_visual_propagates_only_on_change() {
        let mut sync = blocks("<p>Hi</p>");
        assert_eq!(
            sync.apply_visual(|s| s.apply(&SurfaceCommand::CursorDown)),
            None
        );
        let value = sync.apply_visual(|s| s.apply(&SurfaceCommand::ToggleMark(Mark::Bold)));
        assert_eq!(value.as_deref(), Some("<p><strong>Hi</strong></p>"));
    }

    #[test]
    fn test_external_change_in_raw_mode_keeps_raw_buffer() {
        let mut sync = recording("<p>a</p>");
        sync.switch_mode(Mode::Raw);
        sync.on_raw_edit("<p>typed</p>");
        sync.on_external_value_change("<p>reset</p>");
        assert_eq!(sync.raw_text(), "<p>typed</p>");
        assert_eq!(sync.markdown_text(), "reset\n");
    }

    #[test]
    fn test_external_change_in_visual_mode_only_resets_when_different() {
        let mut sync = recording("<p>a</p>");
        sync.on_external_value_change("<p>a</p>");
        assert_eq!(sync.surface().sets, 1);
        sync.on_external_value_change("<p>b</p>");
        assert_eq!(sync.surface().sets, 2);
        assert_eq!(sync.raw_text(), "<p>b</p>");
        assert_eq!(sync.markdown_preview(), "<p>b</p>");
    }

    #[test]
    fn test_external_change_in_markdown_mode_keeps_markdown_buffer() {
        let mut sync = recording("<p>a</p>");
        sync.switch_mode(Mode::Markdown);
        sync.on_markdown_edit("*mine*");
        sync.on_external_value_change("<p>theirs</p>");
        assert_eq!(sync.markdown_text(), "*mine*");
        assert_eq!(sync.raw_text(), "<p>theirs</p>");
    }

    #[test]
    fn test_markdown_edit_then_switch_to_visual() {
        let mut sync = blocks("<p>Hello</p>");
        sync.switch_mode(Mode::Markdown);
        assert_eq!(sync.markdown_text(), "Hello\n");

        let edited = sync.on_markdown_edit("**Hi**");
        assert_eq!(edited.as_deref(), Some("<p><strong>Hi</strong></p>"));
        assert_eq!(sync.markdown_preview(), "<p><strong>Hi</strong></p>");

        let committed = sync.switch_mode(Mode::Visual);
        assert_eq!(committed.as_deref(), Some("<p><strong>Hi</strong></p>"));
        assert_eq!(sync.surface().content(), "<p><strong>Hi</strong></p>");
    }

    #[test]
    fn test_markdown_commit_updates_raw_buffer() {
        let mut sync = blocks("<p>x</p>");
        sync.switch_mode(Mode::Markdown);
        sync.on_markdown_edit("# Head");
        sync.switch_mode(Mode::Raw);
        assert_eq!(sync.raw_text(), "<h1>Head</h1>");
    }

    #[test]
    fn test_raw_to_markdown_commits_raw_first() {
        let mut sync = recording("<p>old</p>");
        sync.switch_mode(Mode::Raw);
        sync.on_raw_edit("<h2>New</h2>");
        assert_eq!(sync.switch_mode(Mode::Markdown), None);
        assert_eq!(sync.surface().content(), "<h2>New</h2>");
        assert_eq!(sync.markdown_text(), "## New\n");
        assert_eq!(sync.markdown_preview(), "<h2>New</h2>");
    }

    #[test]
    fn test_entering_markdown_renders_preview() {
        let mut sync = recording("<ul><li>a</li></ul>");
        sync.switch_mode(Mode::Markdown);
        assert_eq!(sync.markdown_text(), "- a\n");
        assert!(sync.markdown_preview().contains("<li>a</li>"));
    }

    #[test]
    fn test_empty_conversion_retains_prior_markup() {
        let mut sync = ModeSynchronizer::new(
            RecordingSurface::default(),
            BlankConverter,
            ConvertOptions::default(),
            "<p>keep</p>",
        );
        sync.switch_mode(Mode::Markdown);
        let prior = sync.markdown_preview().to_string();
        assert_eq!(sync.on_markdown_edit("something"), Some(prior));

        let committed = sync.switch_mode(Mode::Visual);
        assert_eq!(committed.as_deref(), Some("<p>keep</p>"));
        assert_eq!(sync.surface().content(), "<p>keep</p>");
    }

    #[test]
    fn test_blank_markdown_keeps_prior_markup() {
        let mut sync = blocks("<p>a</p>");
        sync.switch_mode(Mode::Markdown);
        assert_eq!(sync.on_markdown_edit(""), Some("<p>a</p>".to_string()));
        assert_eq!(sync.committed(), "<p>a</p>");

        assert_eq!(sync.switch_mode(Mode::Visual).as_deref(), Some("<p>a</p>"));
        assert_eq!(sync.surface().content(), "<p>a</p>");
    }

    #[test]
    fn test_leaving_raw_commits_buffer_replaced_underneath() {
        let mut sync = blocks("<p>a</p>");
        sync.switch_mode(Mode::Raw);
        sync.on_raw_edit("<p>typed</p>");
        sync.on_external_value_change("<p>disk</p>");
        assert_eq!(sync.raw_text(), "<p>typed</p>");

        assert_eq!(sync.switch_mode(Mode::Visual).as_deref(), Some("<p>typed</p>"));
        assert_eq!(sync.committed(), "<p>typed</p>");
        assert_eq!(sync.surface().content(), "<p>typed</p>");
    }

    #[test]
    fn test_insert_image_only_in_visual_mode() {
        let mut sync = recording("<p>a</p>");
        let value = sync.insert_image("a.png", Some("alt"));
        assert_eq!(value.as_deref(), Some("<p>a</p><img src=\"a.png\">"));
        assert_eq!(
            sync.surface().images,
            vec![("a.png".to_string(), Some("alt".to_string()))]
        );

        sync.switch_mode(Mode::Raw);
        assert_eq!(sync.insert_image("b.png", None), None);
    }

    #[test]
    fn test_line_break_option_is_used_for_markdown() {
        let mut sync = ModeSynchronizer::new(
            RecordingSurface::default(),
            StandardConverter,
            ConvertOptions {
                line_breaks_significant: true,
            },
            "<p>a</p>",
        );
        sync.switch_mode(Mode::Markdown);
        let value = sync.on_markdown_edit("one\ntwo").unwrap_or_default();
        assert!(value.contains("<br"), "{value}");
    }
}
