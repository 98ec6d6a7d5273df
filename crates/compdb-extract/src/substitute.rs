//! Command substitution resolution.
//!
//! Substitutions are executed in the current build directory and their
//! output is spliced into the line text, which is then parsed again. The
//! tree is never edited in place.

use crate::error::{ExtractError, Result};
use crate::process::run_captured;
use compdb_shell::{collect_substitutions, parse, Node};
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, trace};

/// Runs the inner command of a substitution and returns its stdout.
pub trait CommandRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<String>;
}

/// Runs commands through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<String> {
        trace!(command, cwd = %cwd.display(), "running substitution");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(cwd);
        let stdout = run_captured(&mut cmd, command, self.timeout)?;

        String::from_utf8(stdout).map_err(|source| ExtractError::Utf8 {
            command: command.to_string(),
            source,
        })
    }
}

/// A line with every command substitution replaced by its output.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub text: String,
    pub nodes: Vec<Node>,
    /// Number of substitutions that were executed.
    pub substitutions: usize,
}

/// Parse `line`, run its command substitutions in `cwd` and parse the
/// rewritten text.
///
/// Replacements are applied from the highest offset down so the spans of
/// the ones still pending stay valid. Any failure means the line cannot be
/// classified reliably and is returned as an error.
pub fn resolve(line: &str, cwd: &Path, runner: &dyn CommandRunner) -> Result<Resolved> {
    let nodes = parse(line)?;
    let substitutions = collect_substitutions(&nodes);
    if substitutions.is_empty() {
        return Ok(Resolved {
            text: line.to_string(),
            nodes,
            substitutions: 0,
        });
    }

    let count = substitutions.len();
    let mut text = line.to_string();
    for sub in substitutions.iter().rev() {
        let inner = sub.command_span.slice(line);
        let output = runner.run(inner, cwd)?;
        debug!(command = inner, output = output.trim(), "substituted");
        text.replace_range(sub.span.start..sub.span.end, output.trim());
    }

    let nodes = parse(&text)?;
    Ok(Resolved {
        text,
        nodes,
        substitutions: count,
    })
}
