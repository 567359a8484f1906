/// The active editing surface.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Rendered rich-text editing
    #[default]
    Visual,
    /// Raw markup source
    Raw,
    /// Markdown text with a rendered preview
    Markdown,
}

impl Mode {
    pub const ALL: [Self; 3] = [Self::Visual, Self::Raw, Self::Markdown];

    /// Tab label shown in the UI.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Visual => "Visual",
            Self::Raw => "Source",
            Self::Markdown => "Markdown",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Visual => Self::Raw,
            Self::Raw => Self::Markdown,
            Self::Markdown => Self::Visual,
        }
    }
}

/// Live buffer for the active mode.
///
/// Only the active mode's buffer exists. Everything else is derived from
/// the last committed document value when it is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeState {
    /// The visual surface is authoritative.
    Visual,
    /// The raw markup buffer is authoritative.
    Raw { buffer: String },
    /// The markdown buffer is authoritative; `preview` is its rendered markup.
    Markdown { buffer: String, preview: String },
}

impl ModeState {
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Visual => Mode::Visual,
            Self::Raw { .. } => Mode::Raw,
            Self::Markdown { .. } => Mode::Markdown,
        }
    }
}
