//! Process control for reports that end the program.

/// Ends the current process.
///
/// The reporter calls `terminate` as the last step of an error or custom
/// report that asked to exit, after its block has been flushed. Swapping in
/// another implementation keeps exit paths testable.
pub trait Terminate {
    fn terminate(&mut self, code: i32);
}

/// Terminates through `std::process::exit`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&mut self, code: i32) {
        std::process::exit(code)
    }
}

impl<T: Terminate + ?Sized> Terminate for &mut T {
    fn terminate(&mut self, code: i32) {
        (**self).terminate(code)
    }
}
