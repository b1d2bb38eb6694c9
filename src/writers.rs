use crate::{ColorChoice, ColorSpec, WriteColor};
use std::io::{self, Write};

#[cfg(windows)]
use winapi_util::console as wincon;

// `io::Stdout` and `io::Stderr` are distinct types.
#[derive(Clone, Copy, Debug)]
enum StandardStreamType {
    Stdout,
    Stderr,
}

#[derive(Debug)]
enum IoStandardStream {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
}

impl IoStandardStream {
    fn new(sty: StandardStreamType) -> IoStandardStream {
        match sty {
            StandardStreamType::Stdout => IoStandardStream::Stdout(io::stdout()),
            StandardStreamType::Stderr => IoStandardStream::Stderr(io::stderr()),
        }
    }
}

impl io::Write for IoStandardStream {
    #[inline(always)]
    fn write(&mut self, b: &[u8]) -> io::Result<usize> {
        match *self {
            IoStandardStream::Stdout(ref mut s) => s.write(b),
            IoStandardStream::Stderr(ref mut s) => s.write(b),
        }
    }

    // `Stdout::write_all` holds the stream lock for the whole slice, which
    // keeps one report block from interleaving with other output.
    #[inline(always)]
    fn write_all(&mut self, b: &[u8]) -> io::Result<()> {
        match *self {
            IoStandardStream::Stdout(ref mut s) => s.write_all(b),
            IoStandardStream::Stderr(ref mut s) => s.write_all(b),
        }
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        match *self {
            IoStandardStream::Stdout(ref mut s) => s.flush(),
            IoStandardStream::Stderr(ref mut s) => s.flush(),
        }
    }
}

/// Stdout or stderr, colored or not.
///
/// Whether escapes are written is decided once, when the stream is created,
/// from the `ColorChoice` and (on Windows) from whether the console accepts
/// virtual terminal sequences.
#[derive(Debug)]
pub struct StandardStream {
    wtr: Colored<IoStandardStream>,
}

/// A writer paired with the decision to color it.
#[derive(Clone, Debug)]
enum Colored<W> {
    NoColor(NoColor<W>),
    Ansi(Ansi<W>),
}

impl<W> Colored<W> {
    fn new(wtr: W, color: bool) -> Colored<W> {
        if color { Colored::Ansi(Ansi(wtr)) } else { Colored::NoColor(NoColor(wtr)) }
    }

    fn get_ref(&self) -> &W {
        match self {
            Colored::NoColor(w) => &w.0,
            Colored::Ansi(w) => &w.0,
        }
    }
}

impl StandardStream {
    /// Standard output with the given color preference.
    pub fn stdout(choice: ColorChoice) -> StandardStream {
        StandardStream::create(StandardStreamType::Stdout, choice)
    }

    /// Standard error with the given color preference.
    pub fn stderr(choice: ColorChoice) -> StandardStream {
        StandardStream::create(StandardStreamType::Stderr, choice)
    }

    #[cfg(not(windows))]
    fn create(sty: StandardStreamType, choice: ColorChoice) -> StandardStream {
        let color = choice.should_attempt_color();
        StandardStream { wtr: Colored::new(IoStandardStream::new(sty), color) }
    }

    #[cfg(windows)]
    fn create(sty: StandardStreamType, choice: ColorChoice) -> StandardStream {
        let enabled_virtual = choice.should_attempt_color() && {
            let console = match sty {
                StandardStreamType::Stdout => wincon::Console::stdout(),
                StandardStreamType::Stderr => wincon::Console::stderr(),
            };
            console.is_ok_and(|mut con| con.set_virtual_terminal_processing(true).is_ok())
        };
        let color =
            choice.should_attempt_color() && (enabled_virtual || choice.should_force_ansi());
        StandardStream { wtr: Colored::new(IoStandardStream::new(sty), color) }
    }
}

impl io::Write for StandardStream {
    #[inline]
    fn write(&mut self, b: &[u8]) -> io::Result<usize> {
        self.wtr.write(b)
    }

    #[inline]
    fn write_all(&mut self, b: &[u8]) -> io::Result<()> {
        self.wtr.write_all(b)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }
}

impl WriteColor for StandardStream {
    #[inline]
    fn supports_color(&self) -> bool {
        self.wtr.supports_color()
    }

    #[inline]
    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.wtr.set_color(spec)
    }

    #[inline]
    fn reset(&mut self) -> io::Result<()> {
        self.wtr.reset()
    }
}

impl<W: io::Write> io::Write for Colored<W> {
    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Colored::NoColor(w) => w.0.write(buf),
            Colored::Ansi(w) => w.0.write(buf),
        }
    }

    #[inline(always)]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Colored::NoColor(w) => w.0.write_all(buf),
            Colored::Ansi(w) => w.0.write_all(buf),
        }
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Colored::NoColor(w) => w.0.flush(),
            Colored::Ansi(w) => w.0.flush(),
        }
    }
}

impl<W: io::Write> WriteColor for Colored<W> {
    fn supports_color(&self) -> bool {
        matches!(self, Colored::Ansi(_))
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        match self {
            Colored::NoColor(w) => w.set_color(spec),
            Colored::Ansi(w) => w.set_color(spec),
        }
    }

    fn reset(&mut self) -> io::Result<()> {
        match self {
            Colored::NoColor(w) => w.reset(),
            Colored::Ansi(w) => w.reset(),
        }
    }
}

/// An in-memory sink.
///
/// The reporter renders each block into a `Buffer` that matches the color
/// support of its destination and hands the finished bytes over in a single
/// write. Buffers are also how reports are captured in tests.
#[derive(Clone, Debug)]
pub struct Buffer(Colored<Vec<u8>>);

impl Buffer {
    /// A buffer that drops color.
    pub fn no_color() -> Buffer {
        Buffer(Colored::new(Vec::new(), false))
    }

    /// A buffer that keeps color as ANSI escapes.
    pub fn ansi() -> Buffer {
        Buffer(Colored::new(Vec::new(), true))
    }

    /// A buffer whose color handling matches `wtr`.
    pub fn matching<W: WriteColor + ?Sized>(wtr: &W) -> Buffer {
        if wtr.supports_color() { Buffer::ansi() } else { Buffer::no_color() }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length in bytes, escapes included.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.get_ref()
    }
}

impl io::Write for Buffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteColor for Buffer {
    #[inline]
    fn supports_color(&self) -> bool {
        self.0.supports_color()
    }

    #[inline]
    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.0.set_color(spec)
    }

    #[inline]
    fn reset(&mut self) -> io::Result<()> {
        self.0.reset()
    }
}

/// Wraps any writer as a `WriteColor` that ignores colors.
#[derive(Clone, Debug)]
pub struct NoColor<W>(pub W);

impl<W: io::Write> io::Write for NoColor<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: io::Write> WriteColor for NoColor<W> {
    #[inline]
    fn supports_color(&self) -> bool {
        false
    }

    #[inline]
    fn set_color(&mut self, _: &ColorSpec) -> io::Result<()> {
        Ok(())
    }

    #[inline]
    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Wraps any writer as a `WriteColor` that writes ANSI escapes.
#[derive(Clone, Debug)]
pub struct Ansi<W>(pub W);

impl<W: io::Write> io::Write for Ansi<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: io::Write> WriteColor for Ansi<W> {
    #[inline]
    fn supports_color(&self) -> bool {
        true
    }

    #[inline]
    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        crate::ansi::ansi_spec(&mut self.0, spec)
    }

    #[inline]
    fn reset(&mut self) -> io::Result<()> {
        self.0.write_all(b"\x1B[0m")
    }
}
