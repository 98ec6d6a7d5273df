use compdb_build::{CompileCommand, CompileCommands};
use std::fmt;

/// Why a line or command produced no database entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A compiler was found but no source file after it.
    EmptyFileName,
    /// The source file matched an exclusion pattern.
    Excluded,
    /// The line could not be parsed or its substitutions could not be run.
    Unparsable(String),
    /// The line holds no compiler invocation.
    NoCompiler,
    /// Output of a `configure` check.
    ConfigureProbe,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyFileName => f.write_str("Empty file name"),
            SkipReason::Excluded => f.write_str("Excluding file"),
            SkipReason::Unparsable(details) => write!(f, "Failed to parse build command ({details})"),
            SkipReason::NoCompiler => f.write_str("No compiler invocation"),
            SkipReason::ConfigureProbe => f.write_str("Configure check output"),
        }
    }
}

/// Outcome of parsing a whole build log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Number of compiler invocations turned into entries.
    pub count: usize,
    /// Number of lines and commands that produced no entry.
    pub skipped: usize,
    /// Entries in log order.
    pub entries: Vec<CompileCommand>,
}

impl ParseResult {
    pub fn into_database(self) -> CompileCommands {
        CompileCommands::new(self.entries)
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line count: {}, Skipped: {}, Entries: {}",
            self.count,
            self.skipped,
            self.entries.len()
        )
    }
}
