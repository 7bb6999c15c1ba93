//! Text format enumeration shared by messages and media.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Markup format of an event's text body.
///
/// Stored and transmitted as its integer code. Codes outside the known
/// set are rejected on decode; [`TextFormat::label_for`] renders them as
/// `"unknown"` for display of legacy data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TextFormat {
    /// Unformatted text.
    PlainText,
    /// Markdown source.
    Markdown,
    /// HTML source.
    Html,
}

impl TextFormat {
    /// Return the stored integer code.
    pub fn code(&self) -> i32 {
        match self {
            Self::PlainText => 1,
            Self::Markdown => 2,
            Self::Html => 3,
        }
    }

    /// Parse a stored integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::PlainText),
            2 => Some(Self::Markdown),
            3 => Some(Self::Html),
            _ => None,
        }
    }

    /// Return the format as a snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }

    /// Display label for an arbitrary stored code.
    pub fn label_for(code: i32) -> &'static str {
        Self::from_code(code).map_or("unknown", |f| f.as_str())
    }
}

impl TryFrom<i32> for TextFormat {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid text format code {code}"))
    }
}

impl From<TextFormat> for i32 {
    fn from(format: TextFormat) -> i32 {
        format.code()
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
