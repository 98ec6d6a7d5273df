//! Known compiler wrapper programs.

use rustc_hash::FxHashSet;
use std::path::Path;

/// Wrappers recognised without any configuration.
pub const BUILTIN_WRAPPERS: &[&str] = &["ccache", "icecc", "sccache", "distcc"];

/// The set of program names treated as compiler wrappers for one parse run.
///
/// Built once from [`BUILTIN_WRAPPERS`] plus any extras and never mutated
/// afterwards. Lookups compare executable basenames, so `/usr/bin/ccache`
/// and `ccache` are the same wrapper.
#[derive(Debug, Clone)]
pub struct WrapperSet {
    names: FxHashSet<String>,
}

impl WrapperSet {
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: FxHashSet<String> = BUILTIN_WRAPPERS.iter().map(|s| s.to_string()).collect();
        for name in extra {
            let name = basename(name.as_ref());
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
        Self { names }
    }

    pub fn builtin() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.names.contains(basename(word))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for WrapperSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn basename(word: &str) -> &str {
    Path::new(word)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_wrappers() {
        let set = WrapperSet::builtin();
        assert_eq!(set.len(), BUILTIN_WRAPPERS.len());
        assert!(set.contains("ccache"));
        assert!(set.contains("/usr/lib/ccache/ccache"));
        assert!(set.contains("distcc"));
        assert!(!set.contains("time"));
        assert!(!set.contains("gcc"));
    }

    #[test]
    fn test_extra_wrappers() {
        let set = WrapperSet::new(["time", "/opt/bin/colorgcc", ""]);
        assert!(set.contains("time"));
        assert!(set.contains("colorgcc"));
        assert!(set.contains("icecc"));
        assert_eq!(set.len(), BUILTIN_WRAPPERS.len() + 2);
    }
}
