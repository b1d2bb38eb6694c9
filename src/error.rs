//! Errors raised while writing a report.

use std::io;
use thiserror::Error;

/// Why a report could not be delivered.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The destination stream refused the block or failed to flush it.
    #[error("failed to write {kind} report: {source}")]
    Io {
        /// The kind of message being written.
        kind: &'static str,
        #[source]
        source: io::Error,
    },

    /// A required body was empty and the reporter runs in strict mode.
    #[error("{kind} report is missing its required `{field}` field")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

impl ReportError {
    /// Returns true if this error came from the underlying stream.
    pub fn is_io(&self) -> bool {
        matches!(self, ReportError::Io { .. })
    }
}
