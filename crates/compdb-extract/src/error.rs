//! Error types for compdb-extract.

use compdb_shell::ShellError;
use std::process::ExitStatus;
use std::string::FromUtf8Error;
use std::time::Duration;
use thiserror::Error;

/// Result type for compdb-extract operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while resolving or probing commands.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The line is not valid shell syntax.
    #[error("Failed to parse shell command: {0}")]
    Parse(#[from] ShellError),

    /// The subprocess could not be started.
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The subprocess ran but exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The subprocess did not finish in time and was killed.
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The subprocess wrote something other than UTF-8 to stdout.
    #[error("`{command}` produced non UTF-8 output: {source}")]
    Utf8 {
        command: String,
        #[source]
        source: FromUtf8Error,
    },
}
