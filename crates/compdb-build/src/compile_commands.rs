//! compile_commands.json reading and writing.
//!
//! The record layout follows the LLVM JSON compilation database format:
//! `directory` and `file` are always present, with either an `arguments`
//! array or a single `command` string.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A single compile command from compile_commands.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// The working directory for compilation.
    pub directory: PathBuf,

    /// The source file path, as written in the build log.
    pub file: PathBuf,

    /// The compilation arguments (array form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,

    /// The full compilation command (shell-quoted string form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Output file (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl CompileCommand {
    /// A record in `arguments` form.
    pub fn with_arguments(
        directory: impl Into<PathBuf>,
        file: impl Into<PathBuf>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            file: file.into(),
            arguments: Some(arguments),
            command: None,
            output: None,
        }
    }

    /// A record in `command` form.
    pub fn with_command(
        directory: impl Into<PathBuf>,
        file: impl Into<PathBuf>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            file: file.into(),
            arguments: None,
            command: Some(command.into()),
            output: None,
        }
    }

    /// Merge key: two records for the same key describe the same compilation.
    pub fn key(&self) -> (&Path, &Path) {
        (&self.directory, &self.file)
    }

    /// Get the compilation arguments as a vector.
    ///
    /// A `command` string is split with shell quoting rules; if it cannot be
    /// parsed it falls back to splitting on whitespace.
    pub fn get_args(&self) -> Vec<String> {
        if let Some(args) = &self.arguments {
            return args.clone();
        }
        let Some(cmd) = &self.command else {
            return Vec::new();
        };
        match compdb_shell::parse(cmd) {
            Ok(nodes) => nodes
                .iter()
                .flat_map(|node| node.commands())
                .flat_map(|c| c.words.iter().map(|w| w.text.clone()))
                .collect(),
            Err(_) => cmd.split_whitespace().map(|s| s.to_string()).collect(),
        }
    }

    /// The source file joined onto the working directory.
    pub fn source_path(&self) -> PathBuf {
        self.directory.join(&self.file)
    }
}

/// Collection of compile commands (from compile_commands.json).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileCommands {
    commands: Vec<CompileCommand>,
}

impl CompileCommands {
    pub fn new(commands: Vec<CompileCommand>) -> Self {
        Self { commands }
    }

    /// Load compile commands from a JSON file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse compile commands from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> crate::Result<Self> {
        let commands: Vec<CompileCommand> = serde_json::from_str(json)?;
        Ok(Self { commands })
    }

    /// Load a previously written database.
    ///
    /// A missing or unreadable file is not an error: a warning is logged and
    /// an empty database returned, so the first run starts from scratch.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no previous compilation database");
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(db) => {
                debug!(path = %path.display(), entries = db.len(), "loaded previous compilation database");
                db
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to read previous compilation database: {e}");
                Self::default()
            }
        }
    }

    /// Get all compile commands.
    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompileCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Write the database as pretty-printed JSON followed by a newline.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> crate::Result<()> {
        serde_json::to_writer_pretty(&mut writer, &self.commands)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_json_string(&self) -> crate::Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the database to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }
}

impl FromIterator<CompileCommand> for CompileCommands {
    fn from_iter<I: IntoIterator<Item = CompileCommand>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CompileCommands {
    type Item = CompileCommand;
    type IntoIter = std::vec::IntoIter<CompileCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompileCommands {
    type Item = &'a CompileCommand;
    type IntoIter = std::slice::Iter<'a, CompileCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
