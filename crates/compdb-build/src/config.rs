//! Project configuration (compdb.toml format).
//!
//! Every key is optional. Values given on the command line take precedence
//! over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the build directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "compdb.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Build log parsing.
    #[serde(default)]
    pub parse: ParseConfig,

    /// Output database handling.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Command substitution execution.
    #[serde(default)]
    pub substitution: SubstitutionConfig,
}

/// `[parse]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseConfig {
    /// Regular expressions for source files to leave out.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extra program names to treat as compiler wrappers.
    #[serde(default)]
    pub wrappers: Vec<String>,

    /// Emit a single `command` string instead of an `arguments` list.
    #[serde(default)]
    pub command_style: Option<bool>,

    /// Append the compiler's predefined macros to each entry.
    #[serde(default)]
    pub macros: Option<bool>,

    /// Replace the compiler name with its full path.
    #[serde(default)]
    pub full_path: Option<bool>,
}

/// `[database]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Drop entries whose source file does not exist.
    #[serde(default)]
    pub strict: Option<bool>,

    /// Replace the previous database instead of merging into it.
    #[serde(default)]
    pub overwrite: Option<bool>,

    /// Output file path.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// `[substitution]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubstitutionConfig {
    /// Seconds a `$(...)` command may run before it is killed.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `compdb.toml` in `dir`, if there is one.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let path = dir.join(CONFIG_FILE_NAME);
        path.is_file().then_some(path)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.substitution.timeout_secs == Some(0) {
            return Err(crate::BuildError::Validation(
                "substitution.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(pattern) = self.parse.exclude.iter().find(|p| p.is_empty()) {
            return Err(crate::BuildError::Validation(format!(
                "parse.exclude contains an empty pattern ({pattern:?}), which would exclude every file"
            )));
        }
        Ok(())
    }
}
