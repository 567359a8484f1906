//! Text color picking.
//!
//! Colors are entered as hex text. The input keeps whatever the user types,
//! while the applied color only changes once the text parses.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color is empty")]
    Empty,
    #[error("expected 3 or 6 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex digit '{0}'")]
    InvalidDigit(char),
}

/// An sRGB color parsed from `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Extract the color from an inline `style` attribute value
    /// such as `color: #ff0000; font-weight: 600`.
    pub fn from_style(style: &str) -> Option<Self> {
        style.split(';').find_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            if prop.trim().eq_ignore_ascii_case("color") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.is_empty() {
            return Err(ColorError::Empty);
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(bad));
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).unwrap_or_default();
        match digits.len() {
            3 => Ok(Self::new(nibble(0) * 17, nibble(1) * 17, nibble(2) * 17)),
            6 => {
                let byte = |i: usize| (nibble(i) << 4) | nibble(i + 1);
                Ok(Self::new(byte(0), byte(2), byte(4)))
            }
            len => Err(ColorError::InvalidLength(len)),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Swatches offered next to the hex field.
pub const PRESETS: &[(&str, HexColor)] = &[
    ("black", HexColor::new(0x00, 0x00, 0x00)),
    ("red", HexColor::new(0xff, 0x00, 0x00)),
    ("orange", HexColor::new(0xf5, 0x9e, 0x0b)),
    ("green", HexColor::new(0x45, 0xa1, 0x69)),
    ("blue", HexColor::new(0x25, 0x63, 0xeb)),
    ("purple", HexColor::new(0x7c, 0x3a, 0xed)),
    ("gray", HexColor::new(0x64, 0x74, 0x8b)),
];

/// Editable hex field backing the color picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorInput {
    text: String,
    applied: Option<HexColor>,
}

impl ColorInput {
    /// Start from an existing color, if any.
    pub fn new(initial: Option<HexColor>) -> Self {
        Self {
            text: initial.map(|c| c.to_string()).unwrap_or_default(),
            applied: initial,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The last color that parsed successfully.
    pub const fn applied(&self) -> Option<HexColor> {
        self.applied
    }

    /// Whether the current text is a valid color.
    pub fn is_valid(&self) -> bool {
        self.text.parse::<HexColor>().is_ok()
    }

    /// Replace the text. Invalid text is kept but does not change the applied color.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.reparse();
    }

    pub fn push(&mut self, ch: char) {
        self.text.push(ch);
        self.reparse();
    }

    pub fn pop(&mut self) {
        self.text.pop();
        self.reparse();
    }

    /// Pick a swatch from [`PRESETS`] by index.
    pub fn choose_preset(&mut self, index: usize) -> bool {
        let Some((_, color)) = PRESETS.get(index) else {
            return false;
        };
        self.set_text(color.to_string());
        true
    }

    fn reparse(&mut self) {
        match self.text.parse::<HexColor>() {
            Ok(color) => self.applied = Some(color),
            Err(err) => tracing::trace!(text = %self.text, %err, "color text not applied"),
        }
    }
}
