//! Error types for shell line parsing.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Result type for compdb-shell operations.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Reasons a shell line could not be turned into a command tree.
///
/// All of these are recoverable: callers are expected to skip the
/// offending line and keep going.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// A `'` or `"` quote was never closed.
    #[error("unterminated {quote} quote")]
    #[diagnostic(code(compdb::shell::unterminated_quote))]
    UnterminatedQuote {
        quote: char,
        #[label("quote opened here")]
        span: SourceSpan,
    },

    /// A `$(...)`, backtick, `${...}` or `$((...))` construct was never closed.
    #[error("unterminated substitution")]
    #[diagnostic(code(compdb::shell::unterminated_substitution))]
    UnterminatedSubstitution {
        #[label("substitution starts here")]
        span: SourceSpan,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("unexpected token `{token}`")]
    #[diagnostic(code(compdb::shell::unexpected_token))]
    UnexpectedToken {
        token: String,
        #[label("not expected here")]
        span: SourceSpan,
    },

    /// A subshell or brace group was opened but not closed.
    #[error("unbalanced `{open}`")]
    #[diagnostic(
        code(compdb::shell::unbalanced),
        help("subshells and brace groups must be closed on the same logical line")
    )]
    Unbalanced {
        open: char,
        #[label("opened here")]
        span: SourceSpan,
    },

    /// An operator or redirection was followed by nothing.
    #[error("unexpected end of line")]
    #[diagnostic(code(compdb::shell::unexpected_end))]
    UnexpectedEnd {
        #[label("a command or word was expected after this")]
        span: SourceSpan,
    },
}
