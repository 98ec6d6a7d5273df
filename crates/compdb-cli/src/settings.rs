//! Command line flags layered over `compdb.toml`.

use compdb_build::Config;
use compdb_driver::{OutputStyle, ParseOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_OUTPUT: &str = "compile_commands.json";

/// Flags as given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub output: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub wrappers: Vec<String>,
    pub command_style: bool,
    pub macros: bool,
    pub full_path: bool,
    pub overwrite: bool,
    pub no_strict: bool,
    pub timeout_secs: Option<u64>,
}

/// Where the database goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn describe(&self) -> String {
        match self {
            Output::Stdout => "std output".to_string(),
            Output::File(path) => path.display().to_string(),
        }
    }
}

/// Everything one run needs, after merging flags and config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub parse: ParseOptions,
    pub output: Output,
    pub overwrite: bool,
    pub strict: bool,
}

impl Settings {
    /// Flags win over the config file. List options (`exclude`, `wrappers`)
    /// combine both. A config `output` path is taken relative to
    /// `build_dir`; a flag is taken as given.
    pub fn resolve(flags: Flags, config: &Config, build_dir: &Path) -> Self {
        let output = match flags.output {
            Some(path) if path.as_os_str() == "-" => Output::Stdout,
            Some(path) => Output::File(path),
            None => match &config.database.output {
                Some(path) => Output::File(build_dir.join(path)),
                None => Output::File(PathBuf::from(DEFAULT_OUTPUT)),
            },
        };

        let command_style = flags.command_style || config.parse.command_style.unwrap_or(false);
        let parse = ParseOptions {
            exclude: config.parse.exclude.iter().cloned().chain(flags.exclude).collect(),
            extra_wrappers: config.parse.wrappers.iter().cloned().chain(flags.wrappers).collect(),
            add_predefined_macros: flags.macros || config.parse.macros.unwrap_or(false),
            full_path: flags.full_path || config.parse.full_path.unwrap_or(false),
            output_style: if command_style {
                OutputStyle::Command
            } else {
                OutputStyle::Arguments
            },
            substitution_timeout: flags
                .timeout_secs
                .or(config.substitution.timeout_secs)
                .map(Duration::from_secs),
        };

        Self {
            parse,
            output,
            overwrite: flags.overwrite || config.database.overwrite.unwrap_or(false),
            strict: !flags.no_strict && config.database.strict.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(Flags::default(), &Config::default(), Path::new("/b"));
        assert_eq!(settings.output, Output::File(PathBuf::from(DEFAULT_OUTPUT)));
        assert!(settings.strict);
        assert!(!settings.overwrite);
        assert_eq!(settings.parse.output_style, OutputStyle::Arguments);
        assert_eq!(settings.parse.substitution_timeout, None);
    }

    #[test]
    fn test_config_values_apply() {
        let config = Config::from_toml(
            r#"
[parse]
exclude = ["^vendor/"]
command_style = true
[database]
strict = false
output = "out/cc.json"
[substitution]
timeout_secs = 5
"#,
        )
        .unwrap();

        let settings = Settings::resolve(Flags::default(), &config, Path::new("/b"));
        assert_eq!(settings.output, Output::File(PathBuf::from("/b/out/cc.json")));
        assert!(!settings.strict);
        assert_eq!(settings.parse.output_style, OutputStyle::Command);
        assert_eq!(settings.parse.exclude, vec!["^vendor/"]);
        assert_eq!(settings.parse.substitution_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::from_toml(
            r#"
[parse]
exclude = ["^vendor/"]
wrappers = ["time"]
[database]
output = "out/cc.json"
[substitution]
timeout_secs = 5
"#,
        )
        .unwrap();
        let flags = Flags {
            output: Some(PathBuf::from("-")),
            exclude: vec!["^gen/".to_string()],
            wrappers: vec!["nice".to_string()],
            no_strict: true,
            timeout_secs: Some(60),
            ..Flags::default()
        };

        let settings = Settings::resolve(flags, &config, Path::new("/b"));
        assert_eq!(settings.output, Output::Stdout);
        assert!(!settings.strict);
        assert_eq!(settings.parse.exclude, vec!["^vendor/", "^gen/"]);
        assert_eq!(settings.parse.extra_wrappers, vec!["time", "nice"]);
        assert_eq!(settings.parse.substitution_timeout, Some(Duration::from_secs(60)));
    }
}
