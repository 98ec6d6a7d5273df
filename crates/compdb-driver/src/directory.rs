//! Working directory tracking through `make --print-directory` markers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static ENTER_DIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*make(?:\[\d+\])?: Entering directory [`'"](?P<dir>.*)[`'"]\s*$"#)
        .unwrap_or_else(|e| panic!("invalid directory pattern: {e}"))
});

static LEAVE_DIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*make(?:\[\d+\])?: Leaving directory .*$")
        .unwrap_or_else(|e| panic!("invalid directory pattern: {e}"))
});

/// A `make: Entering directory` or `make: Leaving directory` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryMarker {
    Enter(PathBuf),
    Leave,
}

impl DirectoryMarker {
    pub fn parse(line: &str) -> Option<Self> {
        if let Some(caps) = ENTER_DIR.captures(line) {
            return Some(DirectoryMarker::Enter(PathBuf::from(&caps["dir"])));
        }
        LEAVE_DIR.is_match(line).then_some(DirectoryMarker::Leave)
    }
}

/// Stack of build directories. Never empty: the bottom is the project root.
#[derive(Debug, Clone)]
pub struct DirectoryStack {
    stack: Vec<PathBuf>,
}

impl DirectoryStack {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            stack: vec![root.into()],
        }
    }

    /// Enter `dir`. A relative path is taken relative to the current
    /// directory.
    pub fn push(&mut self, dir: impl AsRef<Path>) {
        let dir = self.current().join(dir);
        self.stack.push(dir);
    }

    /// Leave the current directory. Returns `false`, leaving the stack
    /// untouched, when only the root is left.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> &Path {
        // The stack always holds the root.
        self.stack.last().map_or(Path::new(""), PathBuf::as_path)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn apply(&mut self, marker: &DirectoryMarker) -> bool {
        match marker {
            DirectoryMarker::Enter(dir) => {
                self.push(dir);
                true
            }
            DirectoryMarker::Leave => self.pop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        assert_eq!(
            DirectoryMarker::parse("make[1]: Entering directory '/src/lib'"),
            Some(DirectoryMarker::Enter(PathBuf::from("/src/lib")))
        );
        assert_eq!(
            DirectoryMarker::parse("  make[12]: Entering directory `/src/app'  "),
            Some(DirectoryMarker::Enter(PathBuf::from("/src/app")))
        );
        assert_eq!(
            DirectoryMarker::parse("make: Entering directory \"/src\""),
            Some(DirectoryMarker::Enter(PathBuf::from("/src")))
        );
        assert_eq!(
            DirectoryMarker::parse("make[1]: Leaving directory '/src/lib'"),
            Some(DirectoryMarker::Leave)
        );
        assert_eq!(DirectoryMarker::parse("make: Leaving directory '/src'"), Some(DirectoryMarker::Leave));
        assert_eq!(DirectoryMarker::parse("gcc -c a.c"), None);
        assert_eq!(DirectoryMarker::parse("make[1]: Nothing to be done for 'all'."), None);
    }

    #[test]
    fn test_round_trip_restores_directory() {
        let mut dirs = DirectoryStack::new("/build");
        dirs.push("/build/a");
        dirs.push("/build/a/b");
        dirs.push("/elsewhere");
        assert_eq!(dirs.current(), Path::new("/elsewhere"));
        assert_eq!(dirs.depth(), 4);

        assert!(dirs.pop());
        assert!(dirs.pop());
        assert!(dirs.pop());
        assert_eq!(dirs.current(), Path::new("/build"));
    }

    #[test]
    fn test_root_is_never_popped() {
        let mut dirs = DirectoryStack::new("/build");
        assert!(!dirs.pop());
        assert!(!dirs.apply(&DirectoryMarker::Leave));
        assert_eq!(dirs.current(), Path::new("/build"));
        assert_eq!(dirs.depth(), 1);
    }

    #[test]
    fn test_relative_directories() {
        let mut dirs = DirectoryStack::new("/build");
        dirs.apply(&DirectoryMarker::Enter(PathBuf::from("sub")));
        assert_eq!(dirs.current(), Path::new("/build/sub"));
        assert!(dirs.pop());
        assert_eq!(dirs.current(), Path::new("/build"));
    }
}
