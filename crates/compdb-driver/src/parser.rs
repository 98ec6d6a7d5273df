//! The build log parser.

use crate::directory::{DirectoryMarker, DirectoryStack};
use crate::error::{DriverError, Result};
use crate::lines::LogicalLines;
use crate::options::{OutputStyle, ParseOptions};
use crate::result::{ParseResult, SkipReason};
use compdb_build::CompileCommand;
use compdb_extract::{
    extract, resolve, CandidateCommand, CommandRunner, Language, ShellRunner, SystemToolchain,
    Toolchain, WrapperSet,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info, warn};

/// autoconf `checking for gcc... gcc` style output.
static CONFIGURE_PROBE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*checking\s.*\.\.\.").unwrap_or_else(|e| panic!("invalid probe pattern: {e}"))
});

/// Turns build logs into compilation database entries.
///
/// Holds only configuration: every call to [`parse`](Self::parse) starts
/// from a fresh directory stack and fresh counters.
pub struct BuildLogParser {
    options: ParseOptions,
    exclude: Option<Regex>,
    wrappers: WrapperSet,
    runner: Box<dyn CommandRunner>,
    toolchain: Box<dyn Toolchain>,
}

impl BuildLogParser {
    /// Compile the exclusion patterns and the wrapper set.
    ///
    /// An exclusion pattern that is not a valid regex is the one fatal
    /// error: it is reported before any line is read.
    pub fn new(options: ParseOptions) -> Result<Self> {
        let exclude = if options.exclude.is_empty() {
            None
        } else {
            let pattern = format!("^(?:{})", options.exclude.join("|"));
            let regex = Regex::new(&pattern).map_err(|source| DriverError::InvalidExclude {
                pattern: options.exclude.join("|"),
                source,
            })?;
            Some(regex)
        };

        let runner = ShellRunner::new().with_timeout(options.substitution_timeout);
        let toolchain = SystemToolchain::new().with_timeout(options.substitution_timeout);
        Ok(Self {
            wrappers: WrapperSet::new(&options.extra_wrappers),
            exclude,
            runner: Box::new(runner),
            toolchain: Box::new(toolchain),
            options,
        })
    }

    /// Use `runner` to execute command substitutions.
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Use `toolchain` for predefined macros and compiler paths.
    pub fn with_toolchain(mut self, toolchain: impl Toolchain + 'static) -> Self {
        self.toolchain = Box::new(toolchain);
        self
    }

    pub fn wrappers(&self) -> &WrapperSet {
        &self.wrappers
    }

    /// Parse a build log. `project_dir` is the directory commands run in
    /// until the log says otherwise.
    pub fn parse<I, S>(&self, lines: I, project_dir: impl AsRef<Path>) -> ParseResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = ParseResult::default();
        let mut dirs = DirectoryStack::new(project_dir.as_ref());

        for line in LogicalLines::new(lines) {
            let text = line.text.as_str();
            if let Some(marker) = DirectoryMarker::parse(text) {
                if dirs.apply(&marker) {
                    debug!(line = line.number, dir = %dirs.current().display(), "changed directory");
                } else {
                    debug!(line = line.number, "unmatched leaving directory marker ignored");
                }
                continue;
            }

            let mut skip = |command: &str, reason: SkipReason| {
                debug!(line = line.number, "{reason}. Ignoring: '{command}'");
                result.skipped += 1;
            };

            if CONFIGURE_PROBE.is_match(text) {
                skip(text, SkipReason::ConfigureProbe);
                continue;
            }

            let resolved = match resolve(text, dirs.current(), self.runner.as_ref()) {
                Ok(resolved) => resolved,
                Err(e) => {
                    skip(text, SkipReason::Unparsable(e.to_string()));
                    continue;
                }
            };

            let candidates = extract(&resolved.nodes, &resolved.text, &self.wrappers);
            if candidates.is_empty() {
                skip(text, SkipReason::NoCompiler);
                continue;
            }

            let mut entries = Vec::new();
            for candidate in candidates {
                let Some(file) = candidate.file.as_deref() else {
                    skip(&candidate.text, SkipReason::EmptyFileName);
                    continue;
                };
                if self.exclude.as_ref().is_some_and(|re| re.is_match(file)) {
                    skip(&candidate.text, SkipReason::Excluded);
                    continue;
                }
                entries.push(self.entry(&candidate, file, dirs.current()));
            }

            for entry in entries {
                debug!(line = line.number, file = %entry.file.display(), "Adding command {}", result.entries.len());
                result.count += 1;
                result.entries.push(entry);
            }
        }

        debug!("{result}");
        result
    }

    fn entry(&self, candidate: &CandidateCommand, file: &str, directory: &Path) -> CompileCommand {
        let unknown = candidate.unknown_wrappers(&self.wrappers);
        if !unknown.is_empty() {
            info!("Add command with unknown wrapper(s) {}", unknown.join(", "));
        }

        let mut arguments = candidate.arguments().to_vec();

        if self.options.add_predefined_macros {
            let language = Language::detect(&arguments, file);
            match self.toolchain.predefined_macros(&candidate.compiler, &language) {
                Ok(macros) => arguments.extend(macros),
                Err(e) => warn!(compiler = %candidate.compiler, %language, "could not get predefined macros: {e}"),
            }
        }

        if self.options.full_path {
            if let Some(compiler) = arguments.first_mut() {
                *compiler = self.toolchain.resolve_full_path(&candidate.compiler);
            }
        }

        match self.options.output_style {
            OutputStyle::Arguments => CompileCommand::with_arguments(directory, file, arguments),
            OutputStyle::Command => {
                CompileCommand::with_command(directory, file, compdb_shell::join(&arguments))
            }
        }
    }
}

/// Parse `lines` with a parser built from `options`.
pub fn parse_build_log<I, S>(
    lines: I,
    project_dir: impl AsRef<Path>,
    options: ParseOptions,
) -> Result<ParseResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(BuildLogParser::new(options)?.parse(lines, project_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_exclude_is_fatal() {
        let err = BuildLogParser::new(ParseOptions::new().exclude("src/(unclosed"))
            .err()
            .unwrap();
        let DriverError::InvalidExclude { pattern, .. } = err;
        assert_eq!(pattern, "src/(unclosed");
    }

    #[test]
    fn test_patterns_are_joined_into_one_alternation() {
        let parser = BuildLogParser::new(ParseOptions::new().exclude("a/").exclude("b/")).unwrap();
        let re = parser.exclude.as_ref().unwrap();
        assert!(re.is_match("a/x.c"));
        assert!(re.is_match("b/y.c"));
        assert!(!re.is_match("src/a/x.c"));
    }

    #[test]
    fn test_extra_wrappers_extend_builtin_set() {
        let parser = BuildLogParser::new(ParseOptions::new().wrapper("time")).unwrap();
        assert!(parser.wrappers().contains("time"));
        assert!(parser.wrappers().contains("ccache"));
    }

    #[test]
    fn test_each_parse_starts_fresh() {
        let parser = BuildLogParser::new(ParseOptions::new()).unwrap();
        let log = ["make[1]: Entering directory '/other'", "gcc -c a.c"];
        let first = parser.parse(log, "/build");
        let second = parser.parse(["gcc -c a.c"], "/build");
        assert_eq!(first.entries[0].directory, Path::new("/other"));
        assert_eq!(second.entries[0].directory, Path::new("/build"));
        assert_eq!(second.count, 1);
    }
}
