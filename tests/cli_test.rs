//! Integration tests driving the compiled `tidyscan` binary.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const FAKE_TIDY: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    *.cpp)
      echo "$arg:1:5: warning: narrowing conversion [bugprone-narrowing-conversions]"
      ;;
  esac
done
exit 1
"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("main.cpp"), "int x = 3.5;\n").expect("write source");

    let script = dir.path().join("fake-clang-tidy");
    fs::write(&script, FAKE_TIDY).expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");

    fs::write(
        dir.path().join("tidyscan.toml"),
        "executable = \"./fake-clang-tidy\"\n",
    )
    .expect("write config");
    dir
}

fn run_tidyscan(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tidyscan"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to execute tidyscan")
}

fn parse_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("stdout is not valid JSON")
}

#[test]
fn scan_json_reports_diagnostics() {
    let dir = workspace();
    let output = run_tidyscan(dir.path(), &["scan", "--format", "json", "main.cpp"]);
    let value = parse_stdout(&output);

    let diagnostics = value["diagnostics"].as_array().expect("diagnostics array");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["severity"], "warning");
    assert_eq!(diagnostics[0]["rule"], "bugprone-narrowing-conversions");
    assert_eq!(diagnostics[0]["line"], 1);
    assert_eq!(diagnostics[0]["column"], 5);
    // Enriched from the file on disk.
    assert_eq!(diagnostics[0]["source_line"], "int x = 3.5;");
    assert_eq!(diagnostics[0]["position_indicator"], "    ^");

    assert_eq!(value["files_scanned"], 1);
    assert_eq!(value["files_with_findings"], 1);
    assert_eq!(value["rule_counts"]["bugprone-narrowing-conversions"], 1);
}

#[test]
fn scan_defaults_to_discovering_the_current_directory() {
    let dir = workspace();
    let output = run_tidyscan(dir.path(), &["scan", "--format", "json"]);
    let value = parse_stdout(&output);
    assert_eq!(value["files_scanned"], 1);
}

#[test]
fn warnings_only_exit_code_is_zero() {
    let dir = workspace();
    let output = run_tidyscan(dir.path(), &["scan", "--format", "json", "main.cpp"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn text_format_renders_summary() {
    let dir = workspace();
    let output = run_tidyscan(dir.path(), &["scan", "main.cpp"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("narrowing conversion"));
    assert!(stdout.contains("1 warning"));
}

#[test]
fn missing_tool_reports_distinct_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("main.cpp"), "int x;\n").expect("write");

    let output = run_tidyscan(
        dir.path(),
        &["scan", "--executable", "nonexistent_binary_xyz_123", "main.cpp"],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no usable output"));
}

#[test]
fn no_matching_files_reports_distinct_error() {
    let dir = workspace();
    fs::write(dir.path().join("notes.txt"), "hi\n").expect("write");

    let output = run_tidyscan(dir.path(), &["scan", "notes.txt"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no C/C++ source files"));
}

#[test]
fn probe_rejects_fake_tool_without_marker() {
    let dir = workspace();
    let output = run_tidyscan(dir.path(), &["probe"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found or not runnable"));
}

#[test]
fn probe_accepts_llvm_version_output() {
    let dir = workspace();
    let script = dir.path().join("llvm-tidy");
    fs::write(&script, "#!/bin/sh\necho 'LLVM version 18.1.0'\n").expect("write");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");

    let output = run_tidyscan(dir.path(), &["probe", "--executable", "./llvm-tidy"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LLVM version 18.1.0"));
}
