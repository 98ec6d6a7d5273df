//! Compiler invocation extraction for compdb.
//!
//! Given a parsed shell line this crate:
//! - runs `$(...)` and backtick substitutions and re-parses the result
//!   ([`resolve`])
//! - picks out the simple commands that invoke a C or C++ compiler, along
//!   with any wrappers in front of the compiler and the source file
//!   ([`extract`])
//! - asks the installed compilers for their predefined macros and full
//!   paths ([`SystemToolchain`])

mod error;
mod extract;
mod patterns;
mod process;
mod substitute;
mod toolchain;
mod wrappers;

pub use error::{ExtractError, Result};
pub use extract::{extract, CandidateCommand};
pub use patterns::{is_compiler, is_source_file, CC_COMPILE, CPP_COMPILE, SOURCE_FILE};
pub use substitute::{resolve, CommandRunner, Resolved, ShellRunner};
pub use toolchain::{parse_macro_dump, Language, SystemToolchain, Toolchain};
pub use wrappers::{WrapperSet, BUILTIN_WRAPPERS};
