//! Combining a fresh parse with a previously written database.

use crate::compile_commands::{CompileCommand, CompileCommands};
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::debug;

/// Merge `new` into `old`, keyed by (directory, file).
///
/// An entry in `new` replaces the entry in `old` with the same key; when
/// `new` itself repeats a key the last one wins. With `strict` set, entries
/// whose source file no longer exists on disk are dropped.
pub fn merge(old: CompileCommands, new: CompileCommands, strict: bool) -> CompileCommands {
    let mut merged: IndexMap<(PathBuf, PathBuf), CompileCommand> = IndexMap::new();

    for entry in old.into_iter().chain(new) {
        let key = (entry.directory.clone(), entry.file.clone());
        merged.insert(key, entry);
    }

    merged
        .into_values()
        .filter(|entry| {
            if !strict {
                return true;
            }
            let exists = entry.source_path().exists();
            if !exists {
                debug!(file = %entry.source_path().display(), "dropping entry for missing source file");
            }
            exists
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn entry(dir: &str, file: &str, args: &[&str]) -> CompileCommand {
        CompileCommand::with_arguments(dir, file, args.iter().map(|s| s.to_string()).collect())
    }

    fn as_set(db: &CompileCommands) -> HashSet<String> {
        db.iter()
            .map(|e| format!("{}|{}|{:?}", e.directory.display(), e.file.display(), e.get_args()))
            .collect()
    }

    #[test]
    fn test_merge_with_itself_is_idempotent() {
        let db = CompileCommands::new(vec![
            entry("/b", "a.c", &["gcc", "-c", "a.c"]),
            entry("/b", "b.c", &["gcc", "-c", "b.c"]),
            entry("/b/sub", "a.c", &["gcc", "-O2", "-c", "a.c"]),
        ]);
        let merged = merge(db.clone(), db.clone(), false);
        assert_eq!(merged.len(), 3);
        assert_eq!(as_set(&merged), as_set(&db));
    }

    #[test]
    fn test_new_entries_override_old() {
        let old = CompileCommands::new(vec![entry("/b", "a.c", &["gcc", "-O0", "-c", "a.c"])]);
        let new = CompileCommands::new(vec![entry("/b", "a.c", &["gcc", "-O2", "-c", "a.c"])]);
        let merged = merge(old, new.clone(), false);
        assert_eq!(merged, new);
    }

    #[test]
    fn test_disjoint_entries_are_kept() {
        let old = CompileCommands::new(vec![entry("/b", "a.c", &["gcc", "-c", "a.c"])]);
        let new = CompileCommands::new(vec![entry("/b", "b.c", &["gcc", "-c", "b.c"])]);
        let merged = merge(old.clone(), new.clone(), false);
        let expected: CompileCommands = old.into_iter().chain(new).collect();
        assert_eq!(as_set(&merged), as_set(&expected));
    }

    #[test]
    fn test_last_duplicate_in_new_wins() {
        let new = CompileCommands::new(vec![
            entry("/b", "a.c", &["gcc", "-O0", "-c", "a.c"]),
            entry("/b", "a.c", &["gcc", "-O3", "-c", "a.c"]),
        ]);
        let merged = merge(CompileCommands::default(), new, false);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.commands()[0].get_args()[1], "-O3");
    }

    #[test]
    fn test_strict_drops_missing_sources() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("present.c"), "int main(void) { return 0; }\n").unwrap();
        let root = dir.path().to_str().unwrap();

        let old = CompileCommands::new(vec![entry(root, "gone.c", &["gcc", "-c", "gone.c"])]);
        let new = CompileCommands::new(vec![
            entry(root, "present.c", &["gcc", "-c", "present.c"]),
            entry(root, "missing.c", &["gcc", "-c", "missing.c"]),
        ]);

        let strict = merge(old.clone(), new.clone(), true);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict.commands()[0].file, PathBuf::from("present.c"));

        let lax = merge(old, new, false);
        assert_eq!(lax.len(), 3);
    }
}
