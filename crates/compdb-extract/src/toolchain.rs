//! Compiler probes: predefined macros and executable lookup.

use crate::error::Result;
use crate::process::run_captured;
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// Source language of a compilation, as passed to `-x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cxx,
    Other(String),
}

/// Extensions compiled as C++ when no flag says otherwise.
const CXX_EXTENSIONS: &[&str] = &["cc", "cp", "cx", "cpp", "cxx", "c++", "C", "CPP"];

impl Language {
    pub fn from_name(name: &str) -> Self {
        match name {
            "c" => Language::C,
            "c++" => Language::Cxx,
            other => Language::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
            Language::Other(name) => name,
        }
    }

    /// Work out the language of a compilation.
    ///
    /// An explicit `-x <lang>` wins, then the first `-std=` flag (C++ if it
    /// mentions `++`), then the source file extension. Defaults to C.
    pub fn detect<S: AsRef<str>>(arguments: &[S], file: &str) -> Self {
        let mut args = arguments.iter().map(AsRef::as_ref);
        while let Some(arg) = args.next() {
            if arg == "-x" {
                if let Some(lang) = args.next() {
                    return Language::from_name(lang);
                }
            } else if arg.contains("-std=") {
                return if arg.contains("++") {
                    Language::Cxx
                } else {
                    Language::C
                };
            }
        }

        match Path::new(file).extension().and_then(|e| e.to_str()) {
            Some(ext) if CXX_EXTENSIONS.contains(&ext) => Language::Cxx,
            _ => Language::C,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queries about the compilers named in a build log.
pub trait Toolchain {
    /// `-DNAME` / `-DNAME=VALUE` flags for every macro `compiler` predefines
    /// when compiling `language`.
    fn predefined_macros(&self, compiler: &str, language: &Language) -> Result<Vec<String>>;

    /// Full path of `compiler`, or `compiler` itself when it cannot be found.
    fn resolve_full_path(&self, compiler: &str) -> String;
}

/// Probes the compilers installed on this machine.
///
/// Macro dumps are cached per compiler and language, so one instance can be
/// shared across a whole log.
#[derive(Debug, Default)]
pub struct SystemToolchain {
    macros: RwLock<FxHashMap<(String, Language), Vec<String>>>,
    timeout: Option<Duration>,
}

impl SystemToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill a macro dump that runs longer than `timeout`. `None` waits
    /// forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn dump_macros(&self, compiler: &str, language: &Language) -> Result<Vec<String>> {
        let command_line = format!("{compiler} -x {language} -dM -E -");
        debug!(command = %command_line, "dumping predefined macros");

        let mut cmd = Command::new(compiler);
        cmd.args(["-x", language.as_str(), "-dM", "-E", "-"]);
        let stdout = run_captured(&mut cmd, &command_line, self.timeout)?;

        Ok(parse_macro_dump(&String::from_utf8_lossy(&stdout)))
    }
}

impl Toolchain for SystemToolchain {
    fn predefined_macros(&self, compiler: &str, language: &Language) -> Result<Vec<String>> {
        let key = (compiler.to_string(), language.clone());
        if let Some(cached) = self
            .macros
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(cached.clone());
        }

        let macros = self.dump_macros(compiler, language)?;
        self.macros
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, macros.clone());
        Ok(macros)
    }

    fn resolve_full_path(&self, compiler: &str) -> String {
        match which::which(compiler) {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(_) => compiler.to_string(),
        }
    }
}

/// Turn `#define NAME VALUE...` lines into `-D` flags.
///
/// Lines with fewer than two fields are ignored. The value keeps its inner
/// tokens joined by single spaces.
pub fn parse_macro_dump(dump: &str) -> Vec<String> {
    dump.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _define = fields.next()?;
            let name = fields.next()?;
            let value: Vec<&str> = fields.collect();
            Some(if value.is_empty() {
                format!("-D{name}")
            } else {
                format!("-D{name}={}", value.join(" "))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractError;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_explicit_language() {
        let lang = Language::detect(&args(&["gcc", "-x", "c++", "-c", "a.c"]), "a.c");
        assert_eq!(lang, Language::Cxx);

        let lang = Language::detect(&args(&["gcc", "-x", "assembler", "a.s"]), "a.s");
        assert_eq!(lang, Language::Other("assembler".to_string()));
    }

    #[test]
    fn test_detect_from_std_flag() {
        assert_eq!(Language::detect(&args(&["g++", "-std=c++17", "a.c"]), "a.c"), Language::Cxx);
        assert_eq!(Language::detect(&args(&["gcc", "-std=gnu99", "a.cpp"]), "a.cpp"), Language::C);
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(Language::detect(&args(&["g++", "-c", "a.cpp"]), "a.cpp"), Language::Cxx);
        assert_eq!(Language::detect(&args(&["g++", "-c", "b.cc"]), "src/b.cc"), Language::Cxx);
        assert_eq!(Language::detect(&args(&["gcc", "-c", "a.c"]), "a.c"), Language::C);
        assert_eq!(Language::detect(&args(&["gcc", "-c", "boot.S"]), "boot.S"), Language::C);
    }

    #[test]
    fn test_language_display() {
        assert_eq!(Language::C.to_string(), "c");
        assert_eq!(Language::Cxx.to_string(), "c++");
        assert_eq!(Language::from_name("objective-c").as_str(), "objective-c");
    }

    #[test]
    fn test_parse_macro_dump() {
        let dump = "#define __STDC__ 1\n#define __linux\n#define __VERSION__ \"12.2.0 20220819\"\n\n#define\n";
        assert_eq!(
            parse_macro_dump(dump),
            vec!["-D__STDC__=1", "-D__linux", "-D__VERSION__=\"12.2.0 20220819\""]
        );
    }

    #[test]
    fn test_missing_compiler_is_an_error() {
        let toolchain = SystemToolchain::new();
        let err = toolchain
            .predefined_macros("compdb-no-such-compiler", &Language::C)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Spawn { .. }));
    }

    #[test]
    fn test_unknown_compiler_path_falls_back_to_name() {
        let toolchain = SystemToolchain::new();
        assert_eq!(
            toolchain.resolve_full_path("compdb-no-such-compiler"),
            "compdb-no-such-compiler"
        );
    }

    #[test]
    fn test_full_path_of_shell() {
        let toolchain = SystemToolchain::new();
        let path = toolchain.resolve_full_path("sh");
        assert!(Path::new(&path).is_absolute(), "{path} should be absolute");
    }

    #[cfg(unix)]
    #[test]
    fn test_macro_dump_respects_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let compiler = dir.path().join("slow-gcc");
        std::fs::write(&compiler, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&compiler, std::fs::Permissions::from_mode(0o755)).unwrap();

        let toolchain = SystemToolchain::new().with_timeout(Some(Duration::from_millis(200)));
        let started = std::time::Instant::now();
        let err = toolchain
            .predefined_macros(compiler.to_str().unwrap(), &Language::C)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
