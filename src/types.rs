use std::env;
use std::fmt;
use std::str::FromStr;

/// ColorChoice represents the color preferences of an end user.
///
/// The `Default` implementation for this type will select `Auto`, which tries
/// to do the right thing based on the current environment.
///
/// The `FromStr` implementation for this type converts a lowercase kebab-case
/// string of the variant name to the corresponding variant. Any other string
/// results in an error.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ColorChoice {
    /// Try very hard to emit colors. This includes emitting ANSI colors
    /// on Windows if virtual terminal processing can be enabled.
    Always,
    /// AlwaysAnsi is like Always, except it never tries to use anything other
    /// than emitting ANSI color codes.
    AlwaysAnsi,
    /// Try to use colors, but don't force the issue. If the console isn't
    /// available on Windows, or if TERM=dumb, or if `NO_COLOR` is defined, for
    /// example, then don't use colors.
    #[default]
    Auto,
    /// Never emit colors.
    Never,
}

impl FromStr for ColorChoice {
    type Err = ColorChoiceParseError;

    fn from_str(s: &str) -> Result<ColorChoice, ColorChoiceParseError> {
        match s.to_lowercase().as_str() {
            "always" => Ok(ColorChoice::Always),
            "always-ansi" => Ok(ColorChoice::AlwaysAnsi),
            "never" => Ok(ColorChoice::Never),
            "auto" => Ok(ColorChoice::Auto),
            unknown => Err(ColorChoiceParseError {
                unknown_choice: unknown.to_string(),
            }),
        }
    }
}

impl ColorChoice {
    /// Returns true if we should attempt to write colored output.
    pub(crate) fn should_attempt_color(&self) -> bool {
        match *self {
            ColorChoice::Always => true,
            ColorChoice::AlwaysAnsi => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.env_allows_color(),
        }
    }

    #[cfg(not(windows))]
    fn env_allows_color(&self) -> bool {
        match env::var_os("TERM") {
            // If TERM isn't set, then we are in a weird environment that
            // probably doesn't support colors.
            None => return false,
            Some(k) => {
                if k == "dumb" {
                    return false;
                }
            }
        }
        env::var_os("NO_COLOR").is_none()
    }

    #[cfg(windows)]
    fn env_allows_color(&self) -> bool {
        // A missing TERM is normal on Windows consoles.
        if let Some(k) = env::var_os("TERM") {
            if k == "dumb" {
                return false;
            }
        }
        env::var_os("NO_COLOR").is_none()
    }

    /// Returns true if this choice should forcefully use ANSI color codes.
    #[cfg(windows)]
    pub(crate) fn should_force_ansi(&self) -> bool {
        match *self {
            ColorChoice::Always => false,
            ColorChoice::AlwaysAnsi => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => match env::var("TERM") {
                Ok(term) => term != "dumb" && term != "cygwin",
                Err(_) => false,
            },
        }
    }
}

/// An error that occurs when parsing a `ColorChoice` fails.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error(
    "unrecognized color choice '{unknown_choice}': valid choices are: \
     always, always-ansi, never, auto"
)]
pub struct ColorChoiceParseError {
    unknown_choice: String,
}

impl ColorChoiceParseError {
    /// Return the string that couldn't be parsed as a valid color choice.
    pub fn invalid_choice(&self) -> &str {
        &self.unknown_choice
    }
}

/// A color specification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColorSpec {
    pub(crate) fg_color: Option<Color>,
    pub(crate) bg_color: Option<Color>,
    pub(crate) bold: bool,
    pub(crate) intense: bool,
    pub(crate) underline: bool,
    pub(crate) dimmed: bool,
    pub(crate) italic: bool,
    pub(crate) reset: bool,
}

impl Default for ColorSpec {
    fn default() -> ColorSpec {
        ColorSpec {
            fg_color: None,
            bg_color: None,
            bold: false,
            intense: false,
            underline: false,
            dimmed: false,
            italic: false,
            reset: true,
        }
    }
}

impl ColorSpec {
    /// An empty spec: no colors, no styles, reset on.
    pub fn new() -> ColorSpec {
        ColorSpec::default()
    }

    /// A spec that only sets the foreground.
    pub fn fg_only(color: Color) -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color));
        spec
    }

    pub fn fg(&self) -> Option<&Color> {
        self.fg_color.as_ref()
    }

    pub fn set_fg(&mut self, color: Option<Color>) -> &mut ColorSpec {
        self.fg_color = color;
        self
    }

    pub fn bg(&self) -> Option<&Color> {
        self.bg_color.as_ref()
    }

    pub fn set_bg(&mut self, color: Option<Color>) -> &mut ColorSpec {
        self.bg_color = color;
        self
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn set_bold(&mut self, yes: bool) -> &mut ColorSpec {
        self.bold = yes;
        self
    }

    pub fn dimmed(&self) -> bool {
        self.dimmed
    }

    pub fn set_dimmed(&mut self, yes: bool) -> &mut ColorSpec {
        self.dimmed = yes;
        self
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn set_italic(&mut self, yes: bool) -> &mut ColorSpec {
        self.italic = yes;
        self
    }

    pub fn underline(&self) -> bool {
        self.underline
    }

    pub fn set_underline(&mut self, yes: bool) -> &mut ColorSpec {
        self.underline = yes;
        self
    }

    /// Whether `\x1B[0m` is written ahead of this spec's own codes, so a
    /// tag's color never inherits attributes left over from earlier text.
    pub fn reset(&self) -> bool {
        self.reset
    }

    pub fn set_reset(&mut self, yes: bool) -> &mut ColorSpec {
        self.reset = yes;
        self
    }

    /// Named colors are then written as their bright 256-color entry
    /// (`38;5;9` instead of `31` for red).
    pub fn intense(&self) -> bool {
        self.intense
    }

    pub fn set_intense(&mut self, yes: bool) -> &mut ColorSpec {
        self.intense = yes;
        self
    }
}

/// The set of available colors for the terminal foreground/background.
///
/// This type has a `FromStr` impl that can parse colors from their human
/// readable form. The format is as follows:
///
/// 1. Any of the explicitly listed colors in English. They are matched
///    case insensitively.
/// 2. A single 8-bit integer, in either decimal or hexadecimal format.
/// 3. A triple of 8-bit integers separated by a comma, where each integer is
///    in decimal or hexadecimal format.
///
/// Hexadecimal numbers are written with a `0x` prefix.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Color {
    Black,
    Blue,
    Green,
    Red,
    Cyan,
    Magenta,
    Yellow,
    White,
    Ansi256(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parses a numeric color string, either ANSI or RGB.
    fn from_str_numeric(s: &str) -> Result<Color, ParseColorError> {
        fn parse_number(s: &str) -> Option<u8> {
            if let Some(hex_str) = s.strip_prefix("0x") {
                u8::from_str_radix(hex_str, 16).ok()
            } else {
                s.parse::<u8>().ok()
            }
        }

        let err = |kind| ParseColorError { kind, given: s.to_string() };
        let codes: Vec<&str> = s.split(',').map(str::trim).collect();
        match codes.as_slice() {
            [one] => match parse_number(one) {
                Some(n) => Ok(Color::Ansi256(n)),
                None if one.chars().all(|c| c.is_ascii_hexdigit()) => {
                    Err(err(ParseColorErrorKind::InvalidAnsi256))
                }
                None => Err(err(ParseColorErrorKind::InvalidName)),
            },
            [r, g, b] => {
                let mut rgb = [0u8; 3];
                for (slot, code) in rgb.iter_mut().zip([r, g, b]) {
                    *slot = parse_number(code)
                        .ok_or_else(|| err(ParseColorErrorKind::InvalidRgb))?;
                }
                Ok(Color::Rgb(rgb[0], rgb[1], rgb[2]))
            }
            _ => Err(err(ParseColorErrorKind::InvalidRgb)),
        }
    }
}

/// An error from parsing an invalid color.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{}", describe(.kind, .given))]
pub struct ParseColorError {
    kind: ParseColorErrorKind,
    given: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum ParseColorErrorKind {
    InvalidName,
    InvalidAnsi256,
    InvalidRgb,
    SplitRgb,
}

impl ParseColorError {
    /// Return the string that couldn't be parsed as a valid color.
    pub fn invalid(&self) -> &str {
        &self.given
    }
}

fn describe(kind: &ParseColorErrorKind, given: &str) -> String {
    use self::ParseColorErrorKind::*;
    match kind {
        InvalidName => format!(
            "unrecognized color name '{given}'. Choose from: \
             black, blue, green, red, cyan, magenta, yellow, white"
        ),
        InvalidAnsi256 => format!(
            "unrecognized ansi256 color number, \
             should be '[0-255]' (or a hex number), but is '{given}'"
        ),
        InvalidRgb => format!(
            "unrecognized RGB color triple, \
             should be '[0-255],[0-255],[0-255]' (or a hex \
             triple), but is '{given}'"
        ),
        SplitRgb => format!(
            "RGB triple split across color spec attributes in '{given}': \
             write it as 'fg:R;G;B' (or 'R,G,B' on its own)"
        ),
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Color, ParseColorError> {
        match &*s.trim().to_lowercase() {
            "black" => Ok(Color::Black),
            "blue" => Ok(Color::Blue),
            "green" => Ok(Color::Green),
            "red" => Ok(Color::Red),
            "cyan" => Ok(Color::Cyan),
            "magenta" => Ok(Color::Magenta),
            "yellow" => Ok(Color::Yellow),
            "white" => Ok(Color::White),
            _ => Color::from_str_numeric(s.trim()),
        }
    }
}

/// An error from parsing an invalid color specification.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ColorSpecParseError {
    /// An error parsing a color.
    #[error(transparent)]
    InvalidColor(#[from] ParseColorError),
}

impl FromStr for ColorSpec {
    type Err = ColorSpecParseError;

    /// Parses a comma separated list of attributes, e.g.
    /// `fg:red,bold` or `bg:0x10,underline`.
    ///
    /// A bare color sets the foreground. A spec that is nothing but one
    /// color, `10,20,30` included, is that foreground. Inside a longer list
    /// RGB components are separated with `;` (`fg:10;20;30,bold`), and a
    /// number followed by a bare number is rejected rather than read as two
    /// separate colors.
    fn from_str(spec: &str) -> Result<ColorSpec, ColorSpecParseError> {
        if let Ok(color) = Color::from_str(spec) {
            return Ok(ColorSpec::fg_only(color));
        }

        let parse = |s: &str| Color::from_str(&s.replace(';', ","));
        let split_rgb = || ParseColorError {
            kind: ParseColorErrorKind::SplitRgb,
            given: spec.trim().to_string(),
        };
        let mut color_spec = ColorSpec::new();
        // Set when the previous part ended in a single color number.
        let mut after_number = false;
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let color = if let Some(color_str) = part.strip_prefix("fg:") {
                let color = parse(color_str)?;
                color_spec.set_fg(Some(color));
                Some(color)
            } else if let Some(color_str) = part.strip_prefix("bg:") {
                let color = parse(color_str)?;
                color_spec.set_bg(Some(color));
                Some(color)
            } else {
                match part {
                    "bold" => color_spec.set_bold(true),
                    "dimmed" => color_spec.set_dimmed(true),
                    "underline" => color_spec.set_underline(true),
                    "italic" => color_spec.set_italic(true),
                    "intense" => color_spec.set_intense(true),
                    "reset" => color_spec.set_reset(true),
                    "noreset" => color_spec.set_reset(false),
                    _ => {
                        let color = parse(part)?;
                        if after_number && matches!(color, Color::Ansi256(_)) {
                            return Err(split_rgb().into());
                        }
                        color_spec.set_fg(Some(color));
                        after_number = matches!(color, Color::Ansi256(_));
                        continue;
                    }
                };
                None
            };
            after_number = matches!(color, Some(Color::Ansi256(_)));
        }
        Ok(color_spec)
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        crate::ansi::ansi_spec(&mut buf, self).map_err(|_| fmt::Error)?;
        write!(f, "{}", String::from_utf8_lossy(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_choice_parses_kebab_case() {
        assert_eq!("always".parse(), Ok(ColorChoice::Always));
        assert_eq!("Always-Ansi".parse(), Ok(ColorChoice::AlwaysAnsi));
        assert_eq!("never".parse(), Ok(ColorChoice::Never));
        assert_eq!("auto".parse(), Ok(ColorChoice::Auto));

        let err = "sometimes".parse::<ColorChoice>().unwrap_err();
        assert_eq!(err.invalid_choice(), "sometimes");
        assert!(err.to_string().contains("always-ansi"));
    }

    #[test]
    fn never_and_always_ignore_environment() {
        assert!(!ColorChoice::Never.should_attempt_color());
        assert!(ColorChoice::Always.should_attempt_color());
        assert!(ColorChoice::AlwaysAnsi.should_attempt_color());
    }

    #[test]
    fn color_parses_names_and_numbers() {
        assert_eq!("Red".parse(), Ok(Color::Red));
        assert_eq!("7".parse(), Ok(Color::Ansi256(7)));
        assert_eq!("0xff".parse(), Ok(Color::Ansi256(255)));
        assert_eq!("0,0x10, 255".parse(), Ok(Color::Rgb(0, 16, 255)));
    }

    #[test]
    fn color_reports_what_was_wrong() {
        let err = "purple".parse::<Color>().unwrap_err();
        assert_eq!(err.invalid(), "purple");
        assert!(err.to_string().starts_with("unrecognized color name"));

        let err = "ff".parse::<Color>().unwrap_err();
        assert!(err.to_string().contains("ansi256"));

        let err = "1,2".parse::<Color>().unwrap_err();
        assert!(err.to_string().contains("RGB"));

        let err = "1,2,300".parse::<Color>().unwrap_err();
        assert!(err.to_string().contains("RGB"));
    }

    #[test]
    fn color_spec_parses_attribute_list() {
        let spec: ColorSpec = "fg:red, bold, bg:0x10,underline".parse().unwrap();
        assert_eq!(spec.fg(), Some(&Color::Red));
        assert_eq!(spec.bg(), Some(&Color::Ansi256(16)));
        assert!(spec.bold());
        assert!(spec.underline());
        assert!(!spec.italic());
        assert!(spec.reset());

        let spec: ColorSpec = "fg:1;2;3,noreset".parse().unwrap();
        assert_eq!(spec.fg(), Some(&Color::Rgb(1, 2, 3)));
        assert!(!spec.reset());

        let spec: ColorSpec = "green".parse().unwrap();
        assert_eq!(spec, ColorSpec::fg_only(Color::Green));
    }

    #[test]
    fn color_spec_rejects_unknown_color() {
        let err = "fg:mauve".parse::<ColorSpec>().unwrap_err();
        let ColorSpecParseError::InvalidColor(inner) = err;
        assert_eq!(inner.invalid(), "mauve");
    }

    #[test]
    fn lone_rgb_triple_is_a_foreground() {
        let spec: ColorSpec = "10,20,30".parse().unwrap();
        assert_eq!(spec, ColorSpec::fg_only(Color::Rgb(10, 20, 30)));

        let spec: ColorSpec = " 0x10, 0x20, 0x30 ".parse().unwrap();
        assert_eq!(spec.fg(), Some(&Color::Rgb(16, 32, 48)));
    }

    #[test]
    fn rgb_triple_split_across_attributes_is_rejected() {
        for given in ["fg:10,20,30", "bg:1,2,3", "bold,10,20,30"] {
            let err = given.parse::<ColorSpec>().unwrap_err();
            let ColorSpecParseError::InvalidColor(inner) = err;
            assert_eq!(inner.invalid(), given);
            assert!(inner.to_string().contains("R;G;B"), "{inner}");
        }

        let spec: ColorSpec = "fg:10,bg:20".parse().unwrap();
        assert_eq!(spec.fg(), Some(&Color::Ansi256(10)));
        assert_eq!(spec.bg(), Some(&Color::Ansi256(20)));
    }

    #[test]
    fn empty_spec_keeps_defaults() {
        assert_eq!("".parse::<ColorSpec>().unwrap(), ColorSpec::new());
        assert_eq!(" , ".parse::<ColorSpec>().unwrap(), ColorSpec::new());
    }
}
