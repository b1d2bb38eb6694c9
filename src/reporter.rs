//! Rendering requests into blocks and delivering blocks to streams.
//!
//! A report is produced in two steps. `Reporter::render` turns a request
//! into a [`Block`]: the lines to print, the stream they belong to and
//! whether the process should end afterwards. Delivery then writes the
//! block in one piece, flushes, and only then hands control to the
//! [`Terminate`] implementation when the block asked for it.

use crate::request::{
    CustomRequest, ErrorRequest, NoticeRequest, OneRequest, ReportRequest, WarnRequest,
};
use crate::tag::{Palette, Tag};
use crate::{Buffer, ColorChoice, ProcessExit, ReportError, StandardStream, Terminate, WriteColor};
use std::fmt;
use std::io;

/// Status passed to [`Terminate::terminate`] when a report ends the process.
pub const EXIT_FAILURE: i32 = 1;

/// Which of the reporter's two sinks a block is written to.
///
/// Errors and warnings go to the error stream, everything else to the
/// output stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stream {
    /// The output sink, stdout for [`Reporter::stdio`].
    Out,
    /// The error sink, stderr for [`Reporter::stdio`].
    Err,
}

/// A run of text within a line, optionally painted with a tag's color.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Plain(String),
    Tagged(Tag, String),
}

impl Segment {
    /// The text without any color.
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) | Segment::Tagged(_, text) => text,
        }
    }
}

/// One printed line, without its trailing newline.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Line {
    segments: Vec<Segment>,
}

impl Line {
    /// The pieces of the line in print order. Framing lines have none.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A framing line.
    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| s.text().is_empty())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.segments.iter().try_for_each(|s| f.write_str(s.text()))
    }
}

/// The rendered form of one request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    kind: &'static str,
    stream: Stream,
    lines: Vec<Line>,
    exit: bool,
}

impl Block {
    /// The message kind this block was rendered from, e.g. `"warn"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The sink this block is written to.
    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Every line of the block, framing lines included.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Whether the process ends once this block is written.
    pub fn exit(&self) -> bool {
        self.exit
    }

    /// Writes every line, painting tagged segments with `palette`.
    pub fn write_to<W: WriteColor + ?Sized>(&self, wtr: &mut W, palette: &Palette) -> io::Result<()> {
        for line in &self.lines {
            for segment in &line.segments {
                match segment {
                    Segment::Plain(text) => wtr.write_all(text.as_bytes())?,
                    Segment::Tagged(tag, text) => {
                        wtr.set_color(palette.get(*tag))?;
                        wtr.write_all(text.as_bytes())?;
                        wtr.reset()?;
                    }
                }
            }
            wtr.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Plain text, one `\n`-terminated line per block line.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lines.iter().try_for_each(|line| writeln!(f, "{line}"))
    }
}

struct BlockBuilder<'a> {
    marker: &'a str,
    block: Block,
}

impl<'a> BlockBuilder<'a> {
    fn new(marker: &'a str, kind: &'static str, stream: Stream) -> BlockBuilder<'a> {
        BlockBuilder { marker, block: Block { kind, stream, lines: Vec::new(), exit: false } }
    }

    fn push(&mut self, segments: Vec<Segment>) {
        self.block.lines.push(Line { segments });
    }

    fn blank(&mut self) {
        self.push(Vec::new());
    }

    fn header(&mut self, tag: Tag, label: &str) {
        self.push(vec![
            Segment::Plain(self.marker.to_string()),
            Segment::Tagged(tag, format!("[{label}]")),
        ]);
    }

    fn field(&mut self, key: &str, value: &str) {
        self.push(vec![Segment::Plain(format!("{}{key}: {value}", self.marker))]);
    }

    fn tagged_field(&mut self, key: &str, value: &str, tag: Tag) {
        self.push(vec![
            Segment::Plain(format!("{}{key}: ", self.marker)),
            Segment::Tagged(tag, value.to_string()),
        ]);
    }

    fn optional(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.field(key, value);
        }
    }

    fn build(mut self, space: bool, exit: bool) -> Block {
        if space {
            self.block.lines.insert(0, Line::default());
            self.blank();
        }
        self.block.exit = exit;
        self.block
    }
}

/// Settings shared by every report a [`Reporter`] writes.
///
/// Whether color is written at all is a property of the sinks, fixed when
/// they are built (see [`Reporter::stdio`] and [`Buffer`]). The config only
/// decides which colors are used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReporterConfig {
    /// Colors of the `[tag]` headers and of error messages.
    pub palette: Palette,
    /// Prefix of every content line.
    pub marker: String,
    /// Reject requests whose required body is empty instead of printing an
    /// empty value.
    pub strict: bool,
}

impl Default for ReporterConfig {
    fn default() -> ReporterConfig {
        ReporterConfig {
            palette: Palette::default(),
            marker: "> ".to_string(),
            strict: false,
        }
    }
}

impl ReporterConfig {
    /// Replaces the tag colors.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Replaces the `"> "` line prefix.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// See [`ReporterConfig::strict`].
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Renders status messages to an output and an error sink.
///
/// `O` receives notices, custom and one-line reports; `E` receives errors
/// and warnings. Each call is independent: the reporter keeps no state
/// between reports besides its configuration.
#[derive(Debug)]
pub struct Reporter<O, E, T = ProcessExit> {
    out: O,
    err: E,
    terminator: T,
    config: ReporterConfig,
}

impl Reporter<StandardStream, StandardStream, ProcessExit> {
    /// A reporter bound to stdout and stderr that really exits the process.
    ///
    /// `color` is resolved once per stream here; `ColorChoice::Auto` looks at
    /// `TERM` and `NO_COLOR`.
    pub fn stdio(color: ColorChoice) -> Self {
        Reporter::new(StandardStream::stdout(color), StandardStream::stderr(color))
    }
}

impl<O: WriteColor, E: WriteColor> Reporter<O, E, ProcessExit> {
    /// A reporter over two sinks with the default config. Exit paths call
    /// `std::process::exit`; swap that with [`Reporter::with_terminator`].
    pub fn new(out: O, err: E) -> Self {
        Reporter { out, err, terminator: ProcessExit, config: ReporterConfig::default() }
    }
}

impl<O: WriteColor, E: WriteColor, T: Terminate> Reporter<O, E, T> {
    /// Replace how the process is ended on exit paths.
    pub fn with_terminator<U: Terminate>(self, terminator: U) -> Reporter<O, E, U> {
        Reporter { out: self.out, err: self.err, terminator, config: self.config }
    }

    pub fn with_config(mut self, config: ReporterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn out(&self) -> &O {
        &self.out
    }

    pub fn err(&self) -> &E {
        &self.err
    }

    pub fn terminator(&self) -> &T {
        &self.terminator
    }

    pub fn into_parts(self) -> (O, E, T) {
        (self.out, self.err, self.terminator)
    }

    /// Reports any kind of request.
    pub fn report(&mut self, req: &ReportRequest) -> Result<(), ReportError> {
        let block = self.render(req)?;
        self.emit(block)
    }

    /// Reports an error. Errors cannot be silenced. With `exit` set, the
    /// process ends with status 1 afterwards.
    pub fn error(&mut self, req: &ErrorRequest) -> Result<(), ReportError> {
        let block = self.render_error(req)?;
        self.emit(Some(block))
    }

    /// Reports a notice to the output sink unless it is silent.
    pub fn notice(&mut self, req: &NoticeRequest) -> Result<(), ReportError> {
        let block = self.render_notice(req)?;
        self.emit(block)
    }

    /// Reports a warning to the error sink unless it is silent.
    pub fn warn(&mut self, req: &WarnRequest) -> Result<(), ReportError> {
        let block = self.render_warn(req)?;
        self.emit(block)
    }

    /// Reports a custom message. With `exit` set and `silent` unset, the
    /// process ends with status 1 afterwards.
    pub fn custom(&mut self, req: &CustomRequest) -> Result<(), ReportError> {
        let block = self.render_custom(req);
        self.emit(block)
    }

    /// Writes the request's fields as bare `key: value` lines, without a
    /// header or framing.
    pub fn one(&mut self, req: &OneRequest) -> Result<(), ReportError> {
        let block = self.render_one(req);
        self.emit(Some(block))
    }

    /// Renders a request without writing it. Returns `None` for silenced
    /// requests.
    pub fn render(&self, req: &ReportRequest) -> Result<Option<Block>, ReportError> {
        match req {
            ReportRequest::Error(req) => self.render_error(req).map(Some),
            ReportRequest::Notice(req) => self.render_notice(req),
            ReportRequest::Warn(req) => self.render_warn(req),
            ReportRequest::Custom(req) => Ok(self.render_custom(req)),
            ReportRequest::One(req) => Ok(Some(self.render_one(req))),
        }
    }

    fn require(&self, kind: &'static str, field: &'static str, value: &str) -> Result<(), ReportError> {
        if self.config.strict && value.is_empty() {
            return Err(ReportError::MissingField { kind, field });
        }
        Ok(())
    }

    fn render_error(&self, req: &ErrorRequest) -> Result<Block, ReportError> {
        self.require("error", "error", req.error.message())?;

        let mut b = BlockBuilder::new(&self.config.marker, "error", Stream::Err);
        b.header(Tag::Error, Tag::Error.label());
        b.tagged_field("error", req.error.message(), Tag::Error);
        if let Some(stack) = req.error.stack() {
            let mut lines = stack.lines();
            b.field("error stack", lines.next().unwrap_or_default());
            for rest in lines {
                b.push(vec![Segment::Plain(rest.to_string())]);
            }
        }
        b.optional("comment", req.comment.as_deref());
        b.optional("name", req.name.as_deref());
        b.optional("path", req.path.as_deref());
        Ok(b.build(req.space, req.exit))
    }

    fn render_notice(&self, req: &NoticeRequest) -> Result<Option<Block>, ReportError> {
        if req.silent {
            log::debug!("skipping silent notice report");
            return Ok(None);
        }
        self.require("notice", "notice", &req.notice)?;

        let mut b = BlockBuilder::new(&self.config.marker, "notice", Stream::Out);
        b.header(Tag::Notice, Tag::Notice.label());
        b.field("notice", &req.notice);
        b.optional("name", req.name.as_deref());
        b.optional("path", req.path.as_deref());
        Ok(Some(b.build(req.space, false)))
    }

    fn render_warn(&self, req: &WarnRequest) -> Result<Option<Block>, ReportError> {
        if req.silent {
            log::debug!("skipping silent warn report");
            return Ok(None);
        }
        self.require("warn", "warn", &req.warn)?;

        let mut b = BlockBuilder::new(&self.config.marker, "warn", Stream::Err);
        b.header(Tag::Warn, Tag::Warn.label());
        b.field("warn", &req.warn);
        b.optional("comment", req.comment.as_deref());
        b.optional("name", req.name.as_deref());
        b.optional("path", req.path.as_deref());
        Ok(Some(b.build(req.space, false)))
    }

    fn render_custom(&self, req: &CustomRequest) -> Option<Block> {
        if req.silent {
            log::debug!("skipping silent custom report");
            return None;
        }

        let mut b = BlockBuilder::new(&self.config.marker, "custom", Stream::Out);
        if let Some(kind) = req.kind.as_deref().filter(|k| !k.is_empty()) {
            b.header(Tag::Custom, kind);
        }
        for (key, value) in req.printable_fields() {
            b.field(key, value);
        }
        Some(b.build(req.space, req.exit))
    }

    fn render_one(&self, req: &OneRequest) -> Block {
        let mut b = BlockBuilder::new(&self.config.marker, "one", Stream::Out);
        for (key, value) in &req.fields {
            b.field(key, value);
        }
        b.build(false, false)
    }

    /// Delivers a rendered block, then terminates if the block asks for it.
    ///
    /// Termination happens even when delivery failed: a caller that asked
    /// to exit on a fatal error must not keep running because the terminal
    /// went away.
    fn emit(&mut self, block: Option<Block>) -> Result<(), ReportError> {
        let Some(block) = block else {
            return Ok(());
        };
        let delivered = self.deliver(&block);
        if block.exit {
            log::debug!("{} report requested exit with status {EXIT_FAILURE}", block.kind);
            self.terminator.terminate(EXIT_FAILURE);
        }
        delivered
    }

    fn deliver(&mut self, block: &Block) -> Result<(), ReportError> {
        let wtr: &mut dyn WriteColor = match block.stream {
            Stream::Out => &mut self.out,
            Stream::Err => &mut self.err,
        };
        let mut buf = Buffer::matching(&*wtr);
        block
            .write_to(&mut buf, &self.config.palette)
            .and_then(|()| wtr.write_all(buf.as_slice()))
            .and_then(|()| wtr.flush())
            .map_err(|source| ReportError::Io { kind: block.kind, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ErrorBody;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct RecordExit(Vec<i32>);

    impl Terminate for RecordExit {
        fn terminate(&mut self, code: i32) {
            self.0.push(code);
        }
    }

    type Capture = Reporter<Buffer, Buffer, RecordExit>;

    fn capture() -> Capture {
        Reporter::new(Buffer::no_color(), Buffer::no_color()).with_terminator(RecordExit::default())
    }

    fn text(buf: &Buffer) -> String {
        String::from_utf8(buf.as_slice().to_vec()).unwrap()
    }

    fn lines(buf: &Buffer) -> Vec<String> {
        text(buf).lines().map(str::to_string).collect()
    }

    #[test]
    fn error_block_layout() {
        let mut r = capture();
        let req = ErrorRequest::new("boom")
            .with_comment("try again")
            .with_name("loader")
            .with_path("src/a.rs");
        r.error(&req).unwrap();

        assert_eq!(
            lines(r.err()),
            [
                "",
                "> [error]",
                "> error: boom",
                "> comment: try again",
                "> name: loader",
                "> path: src/a.rs",
                "",
            ]
        );
        assert!(r.out().is_empty());
        assert!(r.terminator().0.is_empty());
    }

    #[test]
    fn error_without_exit_returns_normally() {
        let mut r = capture();
        r.error(&ErrorRequest::new("boom")).unwrap();
        assert!(lines(r.err()).iter().any(|l| l.ends_with("boom")));
        assert!(r.terminator().0.is_empty());
    }

    #[test]
    fn error_with_exit_terminates_with_status_one() {
        let mut r = capture();
        r.error(&ErrorRequest::new("boom").with_exit(true)).unwrap();
        assert_eq!(r.terminator().0, [EXIT_FAILURE]);
        assert!(text(r.err()).contains("> error: boom"));
    }

    #[test]
    fn error_prints_stack_lines() {
        let mut r = capture();
        let body = ErrorBody::with_stack("bad input", "caused by: a\ncaused by: b");
        r.error(&ErrorRequest::new(body).with_space(false)).unwrap();
        assert_eq!(
            lines(r.err()),
            ["> [error]", "> error: bad input", "> error stack: caused by: a", "caused by: b"]
        );
    }

    #[test]
    fn error_paints_header_and_message() {
        let mut r = Reporter::new(Buffer::ansi(), Buffer::ansi())
            .with_terminator(RecordExit::default());
        r.error(&ErrorRequest::new("boom").with_space(false)).unwrap();
        assert_eq!(
            text(r.err()),
            "> \x1B[0m\x1B[31m[error]\x1B[0m\n> error: \x1B[0m\x1B[31mboom\x1B[0m\n"
        );
    }

    #[test]
    fn notice_layout_and_stream() {
        let mut r = capture();
        r.notice(&NoticeRequest::new("done").with_path("out/")).unwrap();
        assert_eq!(lines(r.out()), ["", "> [notice]", "> notice: done", "> path: out/", ""]);
        assert!(r.err().is_empty());
    }

    #[test]
    fn warn_layout_and_stream() {
        let mut r = capture();
        let req = WarnRequest::new("deprecated").with_comment("use v2").with_name("api");
        r.warn(&req).unwrap();
        assert_eq!(
            lines(r.err()),
            ["", "> [warn]", "> warn: deprecated", "> comment: use v2", "> name: api", ""]
        );
        assert!(r.out().is_empty());
    }

    #[test]
    fn silent_requests_produce_nothing() {
        let mut r = capture();
        r.notice(&NoticeRequest::new("x").with_silent(true)).unwrap();
        r.warn(&WarnRequest::new("x").with_silent(true)).unwrap();
        r.custom(&CustomRequest::tagged("x").with_field("a", "b").with_silent(true).with_exit(true))
            .unwrap();
        assert!(r.out().is_empty());
        assert!(r.err().is_empty());
        assert!(r.terminator().0.is_empty());
    }

    #[test]
    fn space_controls_framing() {
        let r = capture();
        let framed = r.render(&NoticeRequest::new("n").into()).unwrap().unwrap();
        let blanks: Vec<bool> = framed.lines().iter().map(Line::is_blank).collect();
        assert_eq!(blanks, [true, false, false, true]);

        let bare = r.render(&NoticeRequest::new("n").with_space(false).into()).unwrap().unwrap();
        assert!(bare.lines().iter().all(|l| !l.is_blank()));
    }

    #[test]
    fn custom_block_skips_reserved_keys() {
        let mut r = capture();
        let req = CustomRequest::tagged("build")
            .with_field("file", "a.ts")
            .with_field("type", "ignored")
            .with_field("space", "false")
            .with_space(false);
        r.custom(&req).unwrap();
        assert_eq!(lines(r.out()), ["> [build]", "> file: a.ts"]);
    }

    #[test]
    fn custom_without_type_has_no_header() {
        let mut r = capture();
        r.custom(&CustomRequest::untagged().with_field("k", "v")).unwrap();
        assert_eq!(lines(r.out()), ["", "> k: v", ""]);
    }

    #[test]
    fn custom_exit_terminates_after_printing() {
        let mut r = capture();
        r.custom(&CustomRequest::tagged("fatal").with_field("why", "x").with_exit(true)).unwrap();
        assert_eq!(r.terminator().0, [1]);
        assert!(text(r.out()).contains("> why: x"));
    }

    #[test]
    fn one_prints_only_its_entries() {
        let mut r = capture();
        let req = OneRequest::new().with_field("status", "ok").with_field("count", "3");
        r.one(&req).unwrap();
        assert_eq!(text(r.out()), "> status: ok\n> count: 3\n");
    }

    #[test]
    fn identical_calls_produce_identical_blocks() {
        let mut r = capture();
        let req = WarnRequest::new("again").with_path("p");
        r.warn(&req).unwrap();
        let first = text(r.err());
        r.warn(&req).unwrap();
        assert_eq!(text(r.err()), format!("{first}{first}"));
    }

    #[test]
    fn lenient_mode_prints_empty_body() {
        let mut r = capture();
        r.notice(&NoticeRequest::new("").with_space(false)).unwrap();
        assert_eq!(lines(r.out()), ["> [notice]", "> notice: "]);
    }

    #[test]
    fn strict_mode_rejects_empty_body_before_writing() {
        let mut r = capture().with_config(ReporterConfig::default().with_strict(true));
        let err = r.error(&ErrorRequest::new("").with_exit(true)).unwrap_err();
        assert!(matches!(err, ReportError::MissingField { kind: "error", field: "error" }));
        assert!(r.err().is_empty());
        assert!(r.terminator().0.is_empty());

        // Silent requests are never validated.
        r.warn(&WarnRequest::new("").with_silent(true)).unwrap();
    }

    #[test]
    fn custom_marker() {
        let mut r = capture().with_config(ReporterConfig::default().with_marker("* "));
        r.one(&OneRequest::new().with_field("a", "b")).unwrap();
        assert_eq!(text(r.out()), "* a: b\n");
    }

    #[test]
    fn block_display_is_plain_text() {
        let r = capture();
        let block = r.render(&ErrorRequest::new("boom").with_space(false).into()).unwrap().unwrap();
        assert_eq!(block.to_string(), "> [error]\n> error: boom\n");
        assert_eq!(block.kind(), "error");
        assert_eq!(block.stream(), Stream::Err);
        assert!(!block.exit());
    }

    #[test]
    fn stdio_color_choice_reaches_both_streams() {
        let r = Reporter::stdio(ColorChoice::Never);
        assert!(!r.out().supports_color());
        assert!(!r.err().supports_color());

        #[cfg(not(windows))]
        {
            let r = Reporter::stdio("always".parse().unwrap());
            assert!(r.out().supports_color());
            assert!(r.err().supports_color());
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        Write,
        Flush,
        Exit(i32),
    }

    #[derive(Clone, Default)]
    struct Events(Rc<RefCell<Vec<Event>>>);

    impl io::Write for Events {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().push(Event::Write);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0.borrow_mut().push(Event::Flush);
            Ok(())
        }
    }

    impl WriteColor for Events {
        fn supports_color(&self) -> bool {
            false
        }
        fn set_color(&mut self, _: &crate::ColorSpec) -> io::Result<()> {
            Ok(())
        }
        fn reset(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Terminate for Events {
        fn terminate(&mut self, code: i32) {
            self.0.borrow_mut().push(Event::Exit(code));
        }
    }

    #[test]
    fn exit_happens_after_flush() {
        let events = Events::default();
        let mut r = Reporter::new(Buffer::no_color(), events.clone()).with_terminator(events.clone());
        r.error(&ErrorRequest::new("boom").with_exit(true)).unwrap();
        assert_eq!(*events.0.borrow(), [Event::Write, Event::Flush, Event::Exit(1)]);
    }

    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl WriteColor for Broken {
        fn supports_color(&self) -> bool {
            false
        }
        fn set_color(&mut self, _: &crate::ColorSpec) -> io::Result<()> {
            Ok(())
        }
        fn reset(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_still_exits_and_reports_io() {
        let mut r = Reporter::new(Buffer::no_color(), Broken).with_terminator(RecordExit::default());
        let err = r.error(&ErrorRequest::new("boom").with_exit(true)).unwrap_err();
        assert!(err.is_io());
        assert_eq!(r.terminator().0, [1]);
    }
}
