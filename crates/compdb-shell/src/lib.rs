//! Shell syntax support for compdb.
//!
//! This crate provides:
//! - A tokenizer and recursive-descent parser for one logical line of POSIX
//!   shell, producing command trees with byte-offset spans
//! - Command substitutions (`$(...)` and backticks) as parsed nodes, so their
//!   source text can be spliced out and replaced
//! - Quoting helpers for writing word lists back out as a command string
//!
//! # Example
//!
//! ```
//! let nodes = compdb_shell::parse("ccache gcc -c hello.c && echo done").unwrap();
//! let commands = nodes[0].commands();
//! assert_eq!(commands[0].words[1].as_str(), "gcc");
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod quote;
mod span;

pub use ast::{
    collect_substitutions, AndOr, Command, CommandSubstitution, Group, Node, Operator, Pipeline,
    Redirect, Subshell, SubstitutionStyle, Word,
};
pub use error::{Result, ShellError};
pub use parser::parse;
pub use quote::{join, quote};
pub use span::Span;
