//! Unified error type for frameprobe.
//!
//! Every failure mode of a probe call is a distinct variant so callers can
//! tell "the tool never ran" from "the tool itself failed" from "the tool ran
//! but produced unusable output" programmatically, without string matching.

use std::process::ExitStatus;
use std::time::Duration;

/// Error type covering all failure modes of a probe invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The executable could not be spawned (not found or not executable).
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        /// Name of the tool that failed to start.
        tool: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The external process exited with a non-zero status.
    ///
    /// Carries the full raw output captured from the process.
    /// [`Error::stderr_text`] is the usual way to get a human-readable
    /// diagnosis; this layer never interprets the content itself.
    #[error("{tool} exited with {status}: {}", String::from_utf8_lossy(.stderr).trim())]
    CommandFailed {
        /// Name of the tool that failed.
        tool: String,
        /// The non-zero exit status.
        status: ExitStatus,
        /// Everything the process wrote to stdout, unmodified.
        stdout: Vec<u8>,
        /// Everything the process wrote to stderr, unmodified.
        stderr: Vec<u8>,
    },

    /// The bounded wait elapsed before the process finished.
    ///
    /// The child has been killed and handed to the runtime for reaping by the
    /// time this is returned; no process outlives the call.
    #[error("{tool} timed out after {timeout:?}")]
    Timeout {
        /// Name of the tool that was killed.
        tool: String,
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The process exited successfully but its output failed to decode or
    /// parse. Distinct from [`Error::CommandFailed`]: the tool ran fine, its
    /// output was unusable.
    #[error("{tool} produced malformed output: {message}")]
    MalformedOutput {
        /// Name of the tool whose output was rejected.
        tool: String,
        /// What failed to decode or parse.
        message: String,
    },

    /// An I/O error occurred wiring up or draining the process pipes.
    #[error("I/O error running {tool}: {source}")]
    Io {
        /// Name of the tool involved.
        tool: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::MalformedOutput`].
    pub(crate) fn malformed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// The captured stderr as lossy UTF-8, if this error carries any.
    pub fn stderr_text(&self) -> Option<String> {
        match self {
            Error::CommandFailed { stderr, .. } => {
                Some(String::from_utf8_lossy(stderr).into_owned())
            }
            _ => None,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
