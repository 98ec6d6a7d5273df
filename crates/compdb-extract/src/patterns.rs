//! Name patterns for compilers and source files.

use once_cell::sync::Lazy;
use regex::Regex;

/// C compilers: anything ending in `cc`, `gcc` or `clang`, optionally with a
/// cross prefix (`arm-none-eabi-gcc`) or a version suffix (`clang-5.0`).
pub static CC_COMPILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*-?g?cc(?:-\d+(?:\.\d+)*)?$|^.*-?clang(?:-\d+(?:\.\d+)*)?$")
        .unwrap_or_else(|e| panic!("invalid C compiler pattern: {e}"))
});

/// C++ compilers: `g++`, `c++`, `clang++` with the same prefixes and suffixes.
pub static CPP_COMPILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*-?[gc]\+\+(?:-\d+(?:\.\d+)*)?$|^.*-?clang\+\+(?:-\d+(?:\.\d+)*)?$")
        .unwrap_or_else(|e| panic!("invalid C++ compiler pattern: {e}"))
});

/// Source files, by extension. The extension is matched case-insensitively.
pub static SOURCE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.+\.(?i:c|cc|cpp|cxx|s)$")
        .unwrap_or_else(|e| panic!("invalid source file pattern: {e}"))
});

/// Whether `word` names a C or C++ compiler.
///
/// Options and words that look like source files are never compilers, even
/// when they happen to end in `cc` (`-Wno-cc`, `foo.cc`).
pub fn is_compiler(word: &str) -> bool {
    if word.starts_with('-') || is_source_file(word) {
        return false;
    }
    CC_COMPILE.is_match(word) || CPP_COMPILE.is_match(word)
}

pub fn is_source_file(word: &str) -> bool {
    SOURCE_FILE.is_match(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_compilers() {
        for name in [
            "gcc",
            "cc",
            "clang",
            "/usr/bin/gcc",
            "arm-none-eabi-gcc",
            "x86_64-linux-gnu-gcc-9",
            "clang-5.0",
            "gcc-12.2.1",
        ] {
            assert!(is_compiler(name), "{name} should be a compiler");
        }
    }

    #[test]
    fn test_cpp_compilers() {
        for name in ["g++", "c++", "clang++", "/opt/llvm/bin/clang++-17", "aarch64-linux-gnu-g++"] {
            assert!(is_compiler(name), "{name} should be a compiler");
        }
    }

    #[test]
    fn test_not_compilers() {
        for name in ["make", "echo", "ccache", "ld", "ar", "-Wno-cc", "hello.cc", "gcc-ar", "cc1plus"] {
            assert!(!is_compiler(name), "{name} should not be a compiler");
        }
    }

    #[test]
    fn test_source_files() {
        for name in ["hello.c", "src/a.cc", "b.cpp", "c.cxx", "start.s", "boot.S", "MAIN.C", "x.CPP"] {
            assert!(is_source_file(name), "{name} should be a source file");
        }
        for name in ["hello.o", "a.h", "libfoo.a", ".c", "c", "hello.cs", "a.c.o"] {
            assert!(!is_source_file(name), "{name} should not be a source file");
        }
    }
}
