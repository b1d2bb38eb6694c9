use crate::ColorSpec;
use std::io;

/// This trait describes the behavior of writers that support colored output.
///
/// The reporter writes every block through this trait, so any sink that
/// implements it (a standard stream, an in-memory buffer, a test double)
/// can receive reports.
pub trait WriteColor: io::Write {
    /// Returns true if and only if the underlying writer supports colors.
    fn supports_color(&self) -> bool;

    /// Set the color settings of the writer.
    ///
    /// Subsequent writes to this writer will use these settings until either
    /// `reset` is called or new color settings are set.
    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()>;

    /// Reset the current color settings to their original settings.
    fn reset(&mut self) -> io::Result<()>;
}

impl<T: ?Sized + WriteColor> WriteColor for &mut T {
    fn supports_color(&self) -> bool {
        (**self).supports_color()
    }
    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        (**self).set_color(spec)
    }
    fn reset(&mut self) -> io::Result<()> {
        (**self).reset()
    }
}

impl<T: ?Sized + WriteColor> WriteColor for Box<T> {
    fn supports_color(&self) -> bool {
        (**self).supports_color()
    }
    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        (**self).set_color(spec)
    }
    fn reset(&mut self) -> io::Result<()> {
        (**self).reset()
    }
}
