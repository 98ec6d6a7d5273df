use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_compdb")));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hello.c"), "int main(void) { return 0; }\n").unwrap();
    fs::write(dir.path().join("util.c"), "int util(void) { return 1; }\n").unwrap();
    dir
}

#[test]
fn test_writes_database_for_log_file() {
    let dir = project();
    let root = fs::canonicalize(dir.path()).unwrap();
    fs::write(
        dir.path().join("build.log"),
        "ccache gcc -o hello.o -c hello.c\ngcc -c missing.c\nrm -f app\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["-p", "build.log"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "## Writing compilation database with 1 entries to compile_commands.json",
        ));

    assert_eq!(
        read_json(&dir.path().join("compile_commands.json")),
        json!([{
            "directory": root.to_str().unwrap(),
            "file": "hello.c",
            "arguments": ["gcc", "-o", "hello.o", "-c", "hello.c"]
        }])
    );
}

#[test]
fn test_reads_stdin_and_writes_stdout() {
    let dir = tempfile::tempdir().unwrap();

    let output = cmd()
        .current_dir(dir.path())
        .args(["-o", "-", "--no-strict", "--command-style"])
        .write_stdin("gcc -DNAME=\"a b\" -c hello.c; g++ -c world.cpp\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("std input"))
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output).unwrap();
    let commands: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["command"].as_str().unwrap())
        .collect();
    assert_eq!(commands, ["gcc '-DNAME=a b' -c hello.c", "g++ -c world.cpp"]);
    assert!(!dir.path().join("compile_commands.json").exists());
}

#[test]
fn test_merges_with_previous_database() {
    let dir = project();
    let out = dir.path().join("out.json");

    cmd()
        .current_dir(dir.path())
        .args(["-o", "out.json"])
        .write_stdin("gcc -O0 -c hello.c\n")
        .assert()
        .success();
    cmd()
        .current_dir(dir.path())
        .args(["-o", "out.json"])
        .write_stdin("gcc -O2 -c util.c\ngcc -O2 -c hello.c\n")
        .assert()
        .success();

    let merged = read_json(&out);
    let entries = merged.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let hello = entries.iter().find(|e| e["file"] == "hello.c").unwrap();
    assert_eq!(hello["arguments"][1], "-O2");

    cmd()
        .current_dir(dir.path())
        .args(["-o", "out.json", "--overwrite"])
        .write_stdin("gcc -c util.c\n")
        .assert()
        .success();
    assert_eq!(read_json(&out).as_array().unwrap().len(), 1);
}

#[test]
fn test_build_dir_and_directory_markers() {
    let dir = project();
    let sub = dir.path().join("lib");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("list.c"), "").unwrap();
    let log = format!(
        "make[1]: Entering directory '{}'\ngcc -c list.c\nmake[1]: Leaving directory '{}'\ngcc -c hello.c\n",
        sub.display(),
        sub.display()
    );

    let elsewhere = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(elsewhere.path())
        .args(["-d", dir.path().to_str().unwrap(), "-o", "-"])
        .write_stdin(log)
        .assert()
        .success()
        .stdout(predicate::str::contains("list.c").and(predicate::str::contains("hello.c")));
}

#[test]
fn test_exclude_flag() {
    let dir = project();
    let output = cmd()
        .current_dir(dir.path())
        .args(["-o", "-", "-e", "util", "-v"])
        .write_stdin("gcc -c hello.c\ngcc -c util.c\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["file"], "hello.c");
}

#[test]
fn test_single_verbose_flag_reports_skipped_lines() {
    let dir = project();
    cmd()
        .current_dir(dir.path())
        .args(["-o", "-", "-v"])
        .write_stdin("rm -f app\ngcc -c hello.c\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring: 'rm -f app'"));

    cmd()
        .current_dir(dir.path())
        .args(["-o", "-"])
        .write_stdin("rm -f app\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring").not());
}

#[test]
fn test_invalid_exclude_fails() {
    cmd()
        .args(["-o", "-", "-e", "(unclosed"])
        .write_stdin("gcc -c hello.c\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Exclude files regex not valid"));
}

#[test]
fn test_config_file_is_used() {
    let dir = project();
    fs::write(
        dir.path().join("compdb.toml"),
        "[parse]\ncommand_style = true\n\n[database]\noutput = \"db.json\"\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .write_stdin("gcc -c hello.c\n")
        .assert()
        .success();

    let db = read_json(&dir.path().join("db.json"));
    assert_eq!(db[0]["command"], "gcc -c hello.c");
    assert!(db[0].get("arguments").is_none());
}

#[test]
fn test_bad_config_fails() {
    let dir = project();
    fs::write(dir.path().join("custom.toml"), "[parse]\nunknown = 1\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["--config", "custom.toml"])
        .write_stdin("gcc -c hello.c\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_missing_build_dir_fails() {
    cmd()
        .args(["-d", "/definitely/not/a/dir", "-o", "-"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
