//! ANSI escape sequence generation.
//!
//! Every colored writer in this crate funnels through `ansi_spec`, so the
//! exact bytes emitted for a `ColorSpec` are decided in one place.

use crate::{Color, ColorSpec};
use std::io;

/// Writes the ANSI escape sequence corresponding to the given color
/// specification.
///
/// If the spec asks for a reset, the reset sequence is written before any
/// style or color codes.
pub fn ansi_spec<W: io::Write>(mut wtr: W, spec: &ColorSpec) -> io::Result<()> {
    if spec.reset() {
        write!(wtr, "\x1B[0m")?;
    }
    if spec.bold() {
        write!(wtr, "\x1B[1m")?;
    }
    if spec.dimmed() {
        write!(wtr, "\x1B[2m")?;
    }
    if spec.italic() {
        write!(wtr, "\x1B[3m")?;
    }
    if spec.underline() {
        write!(wtr, "\x1B[4m")?;
    }
    if let Some(c) = spec.fg() {
        ansi_color(&mut wtr, c, false, spec.intense())?;
    }
    if let Some(c) = spec.bg() {
        ansi_color(&mut wtr, c, true, spec.intense())?;
    }
    Ok(())
}

/// Writes the ANSI escape sequence corresponding to the given color.
///
/// If `bg` is true, then the color is treated as a background color.
/// Otherwise, it's treated as a foreground color. Intense named colors use
/// the bright half of the 256-color table.
pub fn ansi_color<W: io::Write>(
    mut wtr: W,
    color: &Color,
    bg: bool,
    intense: bool,
) -> io::Result<()> {
    let base = match *color {
        Color::Black => 0,
        Color::Red => 1,
        Color::Green => 2,
        Color::Yellow => 3,
        Color::Blue => 4,
        Color::Magenta => 5,
        Color::Cyan => 6,
        Color::White => 7,
        Color::Ansi256(n) => {
            let lead = if bg { 48 } else { 38 };
            return write!(wtr, "\x1B[{lead};5;{n}m");
        }
        Color::Rgb(r, g, b) => {
            let lead = if bg { 48 } else { 38 };
            return write!(wtr, "\x1B[{lead};2;{r};{g};{b}m");
        }
    };
    match (intense, bg) {
        (true, false) => write!(wtr, "\x1B[38;5;{}m", base + 8),
        (true, true) => write!(wtr, "\x1B[48;5;{}m", base + 8),
        (false, false) => write!(wtr, "\x1B[3{base}m"),
        (false, true) => write!(wtr, "\x1B[4{base}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_bytes(spec: &ColorSpec) -> String {
        let mut buf = Vec::new();
        ansi_spec(&mut buf, spec).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn named_colors_use_short_codes() {
        assert_eq!(spec_bytes(&ColorSpec::fg_only(Color::Red)), "\x1B[0m\x1B[31m");
        assert_eq!(spec_bytes(&ColorSpec::fg_only(Color::Blue)), "\x1B[0m\x1B[34m");
    }

    #[test]
    fn intense_uses_bright_palette() {
        let mut spec = ColorSpec::fg_only(Color::Yellow);
        spec.set_intense(true).set_reset(false);
        assert_eq!(spec_bytes(&spec), "\x1B[38;5;11m");
    }

    #[test]
    fn extended_colors_and_styles() {
        let mut spec = ColorSpec::new();
        spec.set_bold(true)
            .set_fg(Some(Color::Rgb(1, 2, 3)))
            .set_bg(Some(Color::Ansi256(200)))
            .set_reset(false);
        assert_eq!(spec_bytes(&spec), "\x1B[1m\x1B[38;2;1;2;3m\x1B[48;5;200m");
    }

    #[test]
    fn display_matches_written_bytes() {
        let spec = ColorSpec::fg_only(Color::Green);
        assert_eq!(spec.to_string(), spec_bytes(&spec));
    }
}
