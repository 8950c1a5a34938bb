//! Shared utility functions for output formatting

use std::io;

use serde_json::Value;
use termcolor::{Color, ColorSpec, WriteColor};

/// Character used to build the masking placeholder.
pub const MASK_CHAR: char = '*';

/// Branch drawn before an entry.
pub fn connector(is_last: bool) -> &'static str {
    if is_last { "└── " } else { "├── " }
}

/// Calculate the prefix for the children of an entry.
pub fn continuation_prefix(prefix: &str, is_last: bool) -> String {
    if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    }
}

/// Fixed-length stand-in for a hidden value.
///
/// The length never depends on the value it replaces.
pub fn mask(length: usize) -> String {
    std::iter::repeat_n(MASK_CHAR, length).collect()
}

/// Plain text for a field value: strings unquoted, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text shown for a value under the current masking policy.
pub fn shown_value(value: &Value, show_secrets: bool, password_length: usize) -> String {
    if show_secrets {
        display_value(value)
    } else {
        mask(password_length)
    }
}

/// Role of a piece of text in tree output; decides its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Mount,
    Folder,
    Secret,
    Key,
    Value,
    Masked,
    Metadata,
    Deleted,
}

impl LineStyle {
    pub fn color(&self) -> Option<Color> {
        match self {
            LineStyle::Mount | LineStyle::Folder => Some(Color::Blue),
            LineStyle::Secret => None,
            LineStyle::Key => Some(Color::Cyan),
            LineStyle::Value => Some(Color::Green),
            LineStyle::Masked => Some(Color::Black),
            LineStyle::Metadata => Some(Color::Black),
            LineStyle::Deleted => Some(Color::Red),
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, LineStyle::Mount | LineStyle::Folder)
    }

    /// Whether this style should use intense/bright colors.
    pub fn is_intense(&self) -> bool {
        matches!(self, LineStyle::Masked | LineStyle::Metadata)
    }
}

/// Write `text` in the colour of `style`, then reset.
pub fn write_styled<W: WriteColor>(out: &mut W, text: &str, style: LineStyle) -> io::Result<()> {
    out.set_color(
        ColorSpec::new()
            .set_fg(style.color())
            .set_bold(style.is_bold())
            .set_intense(style.is_intense()),
    )?;
    write!(out, "{}", text)?;
    out.reset()
}
