// src/discovery.rs
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::batch::is_recognized_source;

/// Directories never descended into during source discovery.
pub const PRUNE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".cache",
    ".vscode",
    ".idea",
    "build",
    "out",
    "bazel-out",
    "node_modules",
    "third_party",
    "vendor",
    "external",
];

fn should_prune(name: &str) -> bool {
    PRUNE_DIRS.contains(&name) || name.starts_with("cmake-build-")
}

/// Walks `root` and collects every recognized C/C++ source or header file,
/// as absolute paths in a stable sorted order.
#[must_use]
pub fn discover(root: &Path, verbose: bool) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !should_prune(&e.file_name().to_string_lossy()));

    let mut paths = Vec::new();
    let mut errors = 0;
    for item in walker {
        match item {
            Ok(entry) => {
                if entry.file_type().is_file() && is_recognized_source(entry.path()) {
                    paths.push(entry.path().to_path_buf());
                }
            }
            Err(_) => errors += 1,
        }
    }

    if errors > 0 && verbose {
        eprintln!("WARN: Encountered {errors} errors during file walk");
    }

    paths.sort();
    paths
}
