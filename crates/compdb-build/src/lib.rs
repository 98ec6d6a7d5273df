//! Compilation database model for compdb.
//!
//! This crate provides:
//! - compile_commands.json reading and writing
//! - Merging a fresh parse into a previously written database
//! - Project configuration (`compdb.toml`)
//!
//! # Example
//!
//! ```toml
//! # compdb.toml
//! [parse]
//! exclude = ["^third_party/"]
//! wrappers = ["time"]
//! command_style = false
//!
//! [database]
//! strict = true
//! output = "compile_commands.json"
//!
//! [substitution]
//! timeout_secs = 30
//! ```

mod compile_commands;
mod config;
mod error;
mod merge;

pub use compile_commands::{CompileCommand, CompileCommands};
pub use config::{Config, DatabaseConfig, ParseConfig, SubstitutionConfig, CONFIG_FILE_NAME};
pub use error::{BuildError, Result};
pub use merge::merge;
