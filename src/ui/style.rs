//! Theming and color definitions.
//!
//! Uses semantic ANSI colors that adapt to the terminal's palette; explicit
//! text colors from the document fall back to the xterm-256 cube when the
//! terminal lacks truecolor.

use ratatui::style::{Color, Modifier, Style};

use crate::color::HexColor;

/// Inline formatting accumulated while walking markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: bool,
    pub fg: Option<HexColor>,
}

pub fn heading_style(level: u8) -> Style {
    let light_bg = crate::highlight::is_light_background();
    let (fg, extra) = match level {
        1 => (
            if light_bg { Color::Indexed(24) } else { Color::Cyan },
            Modifier::UNDERLINED,
        ),
        2 => (
            if light_bg { Color::Indexed(22) } else { Color::Green },
            Modifier::empty(),
        ),
        3 => (
            if light_bg { Color::Indexed(58) } else { Color::Yellow },
            Modifier::empty(),
        ),
        4 => (
            if light_bg { Color::Indexed(24) } else { Color::Blue },
            Modifier::empty(),
        ),
        _ => (
            if light_bg { Color::Indexed(54) } else { Color::Magenta },
            Modifier::empty(),
        ),
    };
    Style::default().fg(fg).add_modifier(Modifier::BOLD | extra)
}

pub fn quote_style() -> Style {
    let light_bg = crate::highlight::is_light_background();
    Style::default()
        .fg(if light_bg { Color::Indexed(24) } else { Color::Blue })
        .add_modifier(Modifier::ITALIC)
}

pub fn code_block_style() -> Style {
    let light_bg = crate::highlight::is_light_background();
    Style::default().fg(if light_bg {
        Color::Indexed(238)
    } else {
        Color::Indexed(245)
    })
}

pub fn muted_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn image_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::ITALIC)
}

/// Gutter marker on the block under the visual cursor.
pub fn cursor_marker_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// Toolbar button: highlighted when its format applies, dimmed when unavailable.
pub fn toolbar_style(active: bool, enabled: bool) -> Style {
    if !enabled {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    } else if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn focused_border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// Layer inline formatting over the style of the enclosing block. An explicit
/// font colour wins over the link and code colours.
pub fn style_for_inline(base: Style, inline: InlineStyle) -> Style {
    let modifiers = [
        (inline.emphasis, Modifier::ITALIC),
        (inline.strong, Modifier::BOLD),
        (inline.strikethrough, Modifier::CROSSED_OUT),
        (inline.link, Modifier::UNDERLINED),
    ]
    .into_iter()
    .filter(|(on, _)| *on)
    .fold(Modifier::empty(), |acc, (_, m)| acc | m);
    let style = base.add_modifier(modifiers);

    if let Some(color) = inline.fg {
        return style
            .fg(fg_color_for_terminal(color))
            .remove_modifier(Modifier::DIM);
    }
    // (dark background, light background)
    let palette = if inline.link {
        (Color::LightBlue, Color::Blue)
    } else if inline.code {
        (Color::Red, Color::Indexed(88))
    } else {
        return style;
    };
    if crate::highlight::is_light_background() {
        style.fg(palette.1)
    } else {
        style.fg(palette.0)
    }
}

fn fg_color_for_terminal(fg: HexColor) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("RICHMARK_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if colorterm.is_some_and(|ct| {
        let lower = ct.to_ascii_lowercase();
        lower.contains("truecolor") || lower.contains("24bit")
    }) {
        return true;
    }
    term.is_some_and(|t| {
        let lower = t.to_ascii_lowercase();
        lower.contains("direct") || lower.contains("truecolor")
    })
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Always 0-5
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}
