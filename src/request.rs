//! Per-call descriptions of what to report.
//!
//! Each message kind has its own request type. Requests are plain values
//! built with a constructor and chained `with_*` setters; nothing about a
//! request outlives the call that renders it.

use indexmap::IndexMap;
use std::error::Error as StdError;
use std::fmt;

/// Keys of a [`CustomRequest`] that control behavior and are therefore never
/// printed as `key: value` lines.
pub const RESERVED_KEYS: [&str; 4] = ["silent", "space", "type", "exit"];

/// Returns true if `key` is one of [`RESERVED_KEYS`].
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Any report, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportRequest {
    Error(ErrorRequest),
    Notice(NoticeRequest),
    Warn(WarnRequest),
    Custom(CustomRequest),
    One(OneRequest),
}

macro_rules! impl_from_request {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for ReportRequest {
                fn from(req: $ty) -> ReportRequest {
                    ReportRequest::$variant(req)
                }
            }
        )+
    };
}

impl_from_request! {
    Error => ErrorRequest,
    Notice => NoticeRequest,
    Warn => WarnRequest,
    Custom => CustomRequest,
    One => OneRequest,
}

/// The body of an error report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorBody {
    /// A bare message, printed as is.
    Message(String),
    /// An error value: its message and, when known, how it came about.
    Error { message: String, stack: Option<String> },
}

impl ErrorBody {
    /// Builds a body from an error value.
    ///
    /// The message is the error's `Display` output. The stack lists every
    /// error in its `source()` chain, one `caused by:` entry each, and is
    /// absent when the error has no source.
    pub fn from_error(err: &(dyn StdError + 'static)) -> ErrorBody {
        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            causes.push(format!("caused by: {cause}"));
            next = cause.source();
        }
        ErrorBody::Error {
            message: err.to_string(),
            stack: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }

    /// Builds a body with an explicit stack, such as a captured
    /// `std::backtrace::Backtrace`.
    pub fn with_stack(message: impl Into<String>, stack: impl fmt::Display) -> ErrorBody {
        ErrorBody::Error { message: message.into(), stack: Some(stack.to_string()) }
    }

    pub fn message(&self) -> &str {
        match self {
            ErrorBody::Message(message) | ErrorBody::Error { message, .. } => message,
        }
    }

    pub fn stack(&self) -> Option<&str> {
        match self {
            ErrorBody::Message(_) => None,
            ErrorBody::Error { stack, .. } => stack.as_deref(),
        }
    }
}

impl From<&str> for ErrorBody {
    fn from(message: &str) -> ErrorBody {
        ErrorBody::Message(message.to_string())
    }
}

impl From<String> for ErrorBody {
    fn from(message: String) -> ErrorBody {
        ErrorBody::Message(message)
    }
}

impl From<&std::io::Error> for ErrorBody {
    fn from(err: &std::io::Error) -> ErrorBody {
        ErrorBody::from_error(err)
    }
}

/// Generates the `with_*` setters shared by several request types.
macro_rules! setters {
    (@one comment: text) => {
        /// Secondary explanatory text, printed as `comment: ...`.
        pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
            self.comment = Some(comment.into());
            self
        }
    };
    (@one name: text) => {
        /// The originator of the message, printed as `name: ...`.
        pub fn with_name(mut self, name: impl Into<String>) -> Self {
            self.name = Some(name.into());
            self
        }
    };
    (@one path: text) => {
        /// The file or context the message is about, printed as `path: ...`.
        pub fn with_path(mut self, path: impl Into<String>) -> Self {
            self.path = Some(path.into());
            self
        }
    };
    (@one silent: flag) => {
        /// Suppress all output for this request.
        pub fn with_silent(mut self, silent: bool) -> Self {
            self.silent = silent;
            self
        }
    };
    (@one space: flag) => {
        /// Print a blank line before and after the block. On by default.
        pub fn with_space(mut self, space: bool) -> Self {
            self.space = space;
            self
        }
    };
    (@one exit: flag) => {
        /// End the process with status 1 once the block is written.
        pub fn with_exit(mut self, exit: bool) -> Self {
            self.exit = exit;
            self
        }
    };
    ($ty:ident { $($field:ident: $kind:tt),+ $(,)? }) => {
        impl $ty {
            $( setters!(@one $field: $kind); )+
        }
    };
}

/// An error report. Errors are always printed; there is no silent option.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorRequest {
    pub error: ErrorBody,
    pub comment: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub exit: bool,
    pub space: bool,
}

impl ErrorRequest {
    pub fn new(error: impl Into<ErrorBody>) -> ErrorRequest {
        ErrorRequest {
            error: error.into(),
            comment: None,
            name: None,
            path: None,
            exit: false,
            space: true,
        }
    }
}

setters!(ErrorRequest { comment: text, name: text, path: text, exit: flag, space: flag });

/// An informational message, printed to the output stream under a
/// `[notice]` header. `silent` suppresses it entirely.
#[derive(Clone, Debug, PartialEq)]
pub struct NoticeRequest {
    pub notice: String,
    pub name: Option<String>,
    pub path: Option<String>,
    pub silent: bool,
    pub space: bool,
}

impl NoticeRequest {
    pub fn new(notice: impl Into<String>) -> NoticeRequest {
        NoticeRequest { notice: notice.into(), name: None, path: None, silent: false, space: true }
    }
}

setters!(NoticeRequest { name: text, path: text, silent: flag, space: flag });

#[derive(Clone, Debug, PartialEq)]
pub struct WarnRequest {
    pub warn: String,
    pub comment: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub silent: bool,
    pub space: bool,
}

impl WarnRequest {
    pub fn new(warn: impl Into<String>) -> WarnRequest {
        WarnRequest {
            warn: warn.into(),
            comment: None,
            name: None,
            path: None,
            silent: false,
            space: true,
        }
    }
}

setters!(WarnRequest { comment: text, name: text, path: text, silent: flag, space: flag });

/// A report with a caller-chosen tag and free-form `key: value` lines.
///
/// Fields print in insertion order. Fields whose key is in
/// [`RESERVED_KEYS`] are kept but never printed.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomRequest {
    /// The header label; no header is printed when `None`.
    pub kind: Option<String>,
    pub fields: IndexMap<String, String>,
    pub silent: bool,
    pub exit: bool,
    pub space: bool,
}

impl CustomRequest {
    pub fn new(kind: Option<impl Into<String>>) -> CustomRequest {
        CustomRequest {
            kind: kind.map(Into::into),
            fields: IndexMap::new(),
            silent: false,
            exit: false,
            space: true,
        }
    }

    /// A request with the given header label.
    pub fn tagged(kind: impl Into<String>) -> CustomRequest {
        CustomRequest::new(Some(kind))
    }

    /// A request without a header.
    pub fn untagged() -> CustomRequest {
        CustomRequest::new(None::<String>)
    }

    /// Adds a `key: value` line. Setting an existing key keeps its position.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The fields that will be printed, in order.
    pub fn printable_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(key, _)| !is_reserved(key))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

setters!(CustomRequest { silent: flag, exit: flag, space: flag });

/// Bare `key: value` lines with no header and no framing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OneRequest {
    pub fields: IndexMap<String, String>,
}

impl OneRequest {
    pub fn new() -> OneRequest {
        OneRequest::default()
    }

    /// Adds a line. Unlike custom fields, no key is reserved here.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OneRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> OneRequest {
        OneRequest { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
