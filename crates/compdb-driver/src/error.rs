//! Error types for compdb-driver.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for compdb-driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that stop a build log from being parsed at all.
///
/// Problems with individual lines are never errors; they are counted as
/// skipped in the [`ParseResult`](crate::ParseResult).
#[derive(Error, Diagnostic, Debug)]
pub enum DriverError {
    /// The combined exclusion pattern does not compile.
    #[error("Exclude files regex not valid: {pattern}")]
    #[diagnostic(
        code(compdb::driver::invalid_exclude),
        help("exclusion patterns use Rust regex syntax and are joined with `|`")
    )]
    InvalidExclude {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
