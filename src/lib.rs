/*!
This crate prints structured status messages for command line programs:
errors, notices, warnings, custom tagged messages and bare key/value lines.
Each message is a small block of `> key: value` lines under a colored
`[tag]` header, optionally surrounded by blank lines, and errors or custom
messages can end the process once they are printed.

# Organization

The request types in this crate (`ErrorRequest`, `NoticeRequest`,
`WarnRequest`, `CustomRequest` and `OneRequest`) describe one message each.
They are plain values built with chained `with_*` setters.

A `Reporter` renders requests into `Block`s and writes each block to one of
two sinks: errors and warnings go to the error sink, everything else to the
output sink. Any type implementing `WriteColor` can be a sink, so reports
can go to the terminal through `StandardStream` or to memory through
`Buffer`. Process termination goes through the `Terminate` trait.

The free functions `error`, `notice`, `warn`, `custom` and `one` report to
stdout and stderr with automatic color detection and really exit the process
when asked to.

# Example

```rust,no_run
ezcl::notice(ezcl::NoticeRequest::new("build finished").with_path("target/"));

ezcl::custom(
    ezcl::CustomRequest::tagged("deploy")
        .with_field("host", "example.org")
        .with_field("status", "ok"),
);

ezcl::error(ezcl::ErrorRequest::new("config file not found").with_exit(true));
```

# Example: capturing a report

```rust
use ezcl::{Buffer, Reporter, WarnRequest};

let mut reporter = Reporter::new(Buffer::no_color(), Buffer::no_color());
reporter.warn(&WarnRequest::new("slow disk").with_space(false)).unwrap();
assert_eq!(reporter.err().as_slice(), b"> [warn]\n> warn: slow disk\n");
```
*/

pub mod ansi;
mod error;
mod process;
mod reporter;
mod request;
mod tag;
mod traits;
mod types;
mod writers;

pub use error::ReportError;
pub use process::{ProcessExit, Terminate};
pub use reporter::{Block, EXIT_FAILURE, Line, Reporter, ReporterConfig, Segment, Stream};
pub use request::{
    CustomRequest, ErrorBody, ErrorRequest, NoticeRequest, OneRequest, RESERVED_KEYS,
    ReportRequest, WarnRequest, is_reserved,
};
pub use tag::{Palette, Tag};
pub use traits::WriteColor;
pub use types::{
    Color, ColorChoice, ColorChoiceParseError, ColorSpec, ColorSpecParseError, ParseColorError,
};
pub use writers::{Ansi, Buffer, NoColor, StandardStream};

/// Reports any request to the standard streams, with colors chosen by
/// `ColorChoice::Auto`.
///
/// Write failures are logged and otherwise ignored.
pub fn report(req: impl Into<ReportRequest>) {
    let req = req.into();
    let mut reporter = Reporter::stdio(ColorChoice::Auto);
    if let Err(err) = reporter.report(&req) {
        log::error!("{err}");
    }
}

/// Prints an error to stderr, then exits with status 1 if `exit` is set.
pub fn error(req: ErrorRequest) {
    report(req)
}

/// Prints a notice to stdout unless it is silent.
pub fn notice(req: NoticeRequest) {
    report(req)
}

/// Prints a warning to stderr unless it is silent.
pub fn warn(req: WarnRequest) {
    report(req)
}

/// Prints a custom message to stdout unless it is silent, then exits with
/// status 1 if `exit` is set.
pub fn custom(req: CustomRequest) {
    report(req)
}

/// Prints bare `key: value` lines to stdout.
pub fn one(req: OneRequest) {
    report(req)
}
