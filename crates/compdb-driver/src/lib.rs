//! Build log driver for compdb.
//!
//! Reads the output of a verbose build line by line, follows the
//! `make: Entering directory` markers, and turns every compiler invocation
//! into a compilation database entry.
//!
//! ```no_run
//! use compdb_driver::{parse_build_log, ParseOptions};
//!
//! let log = std::fs::read_to_string("build.log").unwrap();
//! let result = parse_build_log(log.lines(), "/path/to/project", ParseOptions::new()).unwrap();
//! println!("{} entries, {} lines skipped", result.count, result.skipped);
//! ```

mod directory;
mod error;
mod lines;
mod options;
mod parser;
mod result;

pub use directory::{DirectoryMarker, DirectoryStack};
pub use error::{DriverError, Result};
pub use lines::{LogicalLine, LogicalLines};
pub use options::{OutputStyle, ParseOptions};
pub use parser::{parse_build_log, BuildLogParser};
pub use result::{ParseResult, SkipReason};
