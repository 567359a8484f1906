use crate::color::HexColor;

/// Inline marks the toolbar can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Code,
}

impl Mark {
    /// Tag written when applying the mark.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Bold => "strong",
            Self::Italic => "em",
            Self::Code => "code",
        }
    }

    /// Whether `name` is this mark's tag or a legacy alias of it.
    pub fn matches(self, name: &str) -> bool {
        match self {
            Self::Bold => name == "strong" || name == "b",
            Self::Italic => name == "em" || name == "i",
            Self::Code => name == "code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Bullet => "ul",
            Self::Ordered => "ol",
        }
    }
}

/// Formatting state reported to the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Heading(u8),
    Mark(Mark),
    List(ListKind),
    Blockquote,
}

/// Editing commands understood by [`super::BlockSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Type a character at the end of the cursor block
    Type(char),
    /// Delete the last character of the cursor block, or the block itself when empty
    DeleteBack,
    /// Start a new paragraph (or list item) after the cursor
    SplitBlock,
    CursorUp,
    CursorDown,
    ToggleHeading(u8),
    ToggleMark(Mark),
    ToggleList(ListKind),
    ToggleBlockquote,
    /// Apply a text color, or clear it with `None`
    SetColor(Option<HexColor>),
    Undo,
    Redo,
}
