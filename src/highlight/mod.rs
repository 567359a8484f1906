//! Syntax highlighting for the source and markdown text areas.
//!
//! Uses syntect with the bundled Sublime Text syntax definitions.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Grammar used to colour a text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSyntax {
    Markup,
    Markdown,
}

impl SourceSyntax {
    const fn extension(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Markdown => "md",
        }
    }
}

/// Highlight `text` line by line. Line endings are not included in the spans.
pub fn highlight_text(syntax: SourceSyntax, text: &str) -> Vec<Line<'static>> {
    let set = syntax_set();
    let Some(reference) = set.find_syntax_by_extension(syntax.extension()) else {
        return text.lines().map(|l| Line::raw(l.to_string())).collect();
    };

    let background = background();
    let mut highlighter = HighlightLines::new(reference, theme_for(background));
    let mut lines: Vec<Line<'static>> = LinesWithEndings::from(text)
        .map(|line| {
            let ranges = highlighter.highlight_line(line, set).unwrap_or_default();
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, piece)| (style, piece.trim_end_matches(['\n', '\r'])))
                .filter(|(_, piece)| !piece.is_empty())
                .map(|(style, piece)| {
                    let fg = style.foreground;
                    let (r, g, b) = background.readable((fg.r, fg.g, fg.b));
                    Span::styled(piece.to_string(), Style::default().fg(Color::Rgb(r, g, b)))
                })
                .collect();
            Line::from(spans)
        })
        .collect();
    if text.is_empty() || text.ends_with('\n') {
        lines.push(Line::default());
    }
    lines
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        tracing::debug!("loading syntax definitions");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_for(background: Background) -> &'static Theme {
    static DARK: OnceLock<Theme> = OnceLock::new();
    static LIGHT: OnceLock<Theme> = OnceLock::new();
    let (cell, preferred) = match background {
        Background::Dark => (
            &DARK,
            ["base16-eighties.dark", "base16-ocean.dark"].as_slice(),
        ),
        Background::Light => (&LIGHT, ["InspiredGitHub", "Solarized (light)"].as_slice()),
    };
    cell.get_or_init(|| {
        let mut themes = ThemeSet::load_defaults().themes;
        let name = preferred.iter().find(|name| themes.contains_key(**name));
        tracing::debug!(?background, theme = ?name, "highlight theme selected");
        name.and_then(|name| themes.remove(*name))
            .or_else(|| themes.into_values().next())
            .unwrap_or_default()
    })
}

/// Terminal background the palette is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Dark,
    Light,
}

impl Background {
    /// Darken bright colours that would wash out on a light background.
    #[allow(clippy::cast_possible_truncation)]
    fn readable(self, rgb: (u8, u8, u8)) -> (u8, u8, u8) {
        if self == Self::Dark {
            return rgb;
        }
        // Integer Rec. 709 luma, scaled by 10000.
        let luma = 2126 * u32::from(rgb.0) + 7152 * u32::from(rgb.1) + 722 * u32::from(rgb.2);
        if luma < 155 * 10_000 {
            return rgb;
        }
        let darken = |c: u8| (u32::from(c) * 42 / 100) as u8;
        (darken(rgb.0), darken(rgb.1), darken(rgb.2))
    }

    /// Parse `COLORFGBG` ("fg;bg" or "fg;other;bg"); unknown means dark.
    fn from_colorfgbg(value: Option<&str>) -> Self {
        match value.and_then(|v| v.rsplit(';').next()?.parse::<u8>().ok()) {
            Some(bg) if bg >= 7 => Self::Light,
            _ => Self::Dark,
        }
    }
}

const DETECT: u8 = 0;
const FORCE_DARK: u8 = 1;
const FORCE_LIGHT: u8 = 2;

static BACKGROUND_OVERRIDE: AtomicU8 = AtomicU8::new(DETECT);

/// Force a light or dark palette; `None` detects it from `COLORFGBG`.
pub fn set_background_mode(mode: Option<Background>) {
    let raw = match mode {
        None => DETECT,
        Some(Background::Dark) => FORCE_DARK,
        Some(Background::Light) => FORCE_LIGHT,
    };
    BACKGROUND_OVERRIDE.store(raw, Ordering::Relaxed);
}

/// Whether the terminal is treated as having a light background.
pub fn is_light_background() -> bool {
    background() == Background::Light
}

fn background() -> Background {
    match BACKGROUND_OVERRIDE.load(Ordering::Relaxed) {
        FORCE_DARK => Background::Dark,
        FORCE_LIGHT => Background::Light,
        _ => Background::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()),
    }
}
