//! Semantic tags and the colors they are painted with.

use crate::{Color, ColorSpec, ColorSpecParseError};
use std::fmt;
use std::str::FromStr;

/// The semantic category of a piece of report text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Tag {
    Error,
    Notice,
    Warn,
    Custom,
}

impl Tag {
    /// The label printed inside a header's brackets.
    pub fn label(self) -> &'static str {
        match self {
            Tag::Error => "error",
            Tag::Notice => "notice",
            Tag::Warn => "warn",
            Tag::Custom => "custom",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps each [`Tag`] to the [`ColorSpec`] it is painted with.
///
/// The default palette is red for errors, blue for notices, yellow for
/// warnings and green for custom headers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    error: ColorSpec,
    notice: ColorSpec,
    warn: ColorSpec,
    custom: ColorSpec,
}

impl Default for Palette {
    fn default() -> Palette {
        Palette {
            error: ColorSpec::fg_only(Color::Red),
            notice: ColorSpec::fg_only(Color::Blue),
            warn: ColorSpec::fg_only(Color::Yellow),
            custom: ColorSpec::fg_only(Color::Green),
        }
    }
}

impl Palette {
    /// The spec `tag` is currently painted with.
    pub fn get(&self, tag: Tag) -> &ColorSpec {
        match tag {
            Tag::Error => &self.error,
            Tag::Notice => &self.notice,
            Tag::Warn => &self.warn,
            Tag::Custom => &self.custom,
        }
    }

    /// Replace the color used for `tag`.
    pub fn set(&mut self, tag: Tag, spec: ColorSpec) -> &mut Palette {
        match tag {
            Tag::Error => self.error = spec,
            Tag::Notice => self.notice = spec,
            Tag::Warn => self.warn = spec,
            Tag::Custom => self.custom = spec,
        }
        self
    }

    /// Replace the color used for `tag` with one parsed from the
    /// [`ColorSpec`] string grammar, e.g. `"fg:magenta,bold"`.
    pub fn set_str(&mut self, tag: Tag, spec: &str) -> Result<&mut Palette, ColorSpecParseError> {
        let spec = ColorSpec::from_str(spec)?;
        Ok(self.set(tag, spec))
    }

    /// Returns `text` wrapped in the ANSI sequence for `tag`, followed by
    /// a reset.
    pub fn paint(&self, tag: Tag, text: &str) -> String {
        format!("{}{text}\x1B[0m", self.get(tag))
    }
}
