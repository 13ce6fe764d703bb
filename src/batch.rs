//! Batch planning and clang-tidy argument construction.
//!
//! Everything here is a pure transformation of (file list, run options,
//! resolved configuration); process execution lives in `pool`/`invoke`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Config, RunOptions};

/// Hard ceiling on parallel clang-tidy processes, regardless of host cores.
pub const MAX_JOBS: usize = 8;

/// Project-root file that overrides check selection and filters.
pub const RULE_CONFIG_FILE: &str = ".clang-tidy";

pub const SOURCE_EXT_PATTERN: &str =
    r"(?i)\.(c|cc|cp|cpp|cxx|c\+\+|m|mm|h|hh|hp|hpp|hxx|h\+\+|inl|inc)$";

static SOURCE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SOURCE_EXT_PATTERN).unwrap_or_else(|_| panic!("Invalid Regex")));

/// Whether `path` has a recognized C/C++ source or header extension.
#[must_use]
pub fn is_recognized_source(path: &Path) -> bool {
    let filename = path.file_name().map_or("", |f| f.to_str().unwrap_or(""));
    SOURCE_EXT_RE.is_match(filename)
}

/// Drops everything without a recognized source/header extension,
/// preserving input order.
#[must_use]
pub fn filter_sources(files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|p| is_recognized_source(p))
        .cloned()
        .collect()
}

/// Effective parallel job count: explicit override, else host core count,
/// capped at `MAX_JOBS`, never below 1.
#[must_use]
pub fn effective_jobs(configured: Option<usize>) -> usize {
    let jobs = configured.unwrap_or_else(|| {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    });
    jobs.clamp(1, MAX_JOBS)
}

/// Partitions `files` into at most `jobs` batches of `ceil(N / jobs)` files
/// each. Batches cover every input exactly once and preserve relative order.
#[must_use]
pub fn plan_batches(files: &[PathBuf], jobs: usize) -> Vec<Vec<PathBuf>> {
    if files.is_empty() {
        return Vec::new();
    }
    let batch_size = files.len().div_ceil(jobs.max(1));
    files.chunks(batch_size).map(<[PathBuf]>::to_vec).collect()
}

/// Locates the directory holding `compile_commands.json`: the configured
/// path first, then `<root>/build`, then the root itself.
#[must_use]
pub fn resolve_compile_commands(root: &Path, config: &Config) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(configured) = &config.compile_commands_path {
        let dir = if configured.is_absolute() {
            configured.clone()
        } else {
            root.join(configured)
        };
        candidates.push(dir);
    }
    candidates.push(root.join("build"));
    candidates.push(root.to_path_buf());

    candidates
        .into_iter()
        .find(|dir| dir.join("compile_commands.json").is_file())
}

/// Builds the concrete argument vector for one batch.
///
/// Flag precedence:
/// 1. A `.clang-tidy` in the project root is passed as `--config-file` and
///    suppresses the `-checks` flag entirely (the file's own list wins).
/// 2. Otherwise `-checks` is passed, defaulting to `*`.
/// 3. `-header-filter` is passed when explicitly configured, or when no
///    `.clang-tidy` exists (defaulting to the escaped project root); with a
///    `.clang-tidy` and no explicit filter the flag is omitted.
/// 4. `-p` is appended whenever a compilation database was resolved.
/// 5. Extra arguments follow all computed flags, verbatim and in order.
/// 6. Batch files are appended as positionals.
#[must_use]
pub fn build_args(
    root: &Path,
    config: &Config,
    options: &RunOptions,
    compile_commands: Option<&Path>,
    files: &[PathBuf],
) -> Vec<String> {
    let mut args = Vec::new();

    let rule_config = root.join(RULE_CONFIG_FILE);
    let has_rule_config = rule_config.is_file();

    if has_rule_config {
        args.push(format!("--config-file={}", rule_config.display()));
    } else {
        let checks = options.checks.as_deref().unwrap_or("*");
        args.push(format!("-checks={checks}"));
    }

    match (&options.header_filter, has_rule_config) {
        (Some(filter), _) => args.push(format!("-header-filter={filter}")),
        (None, false) => {
            let escaped = regex::escape(&root.display().to_string());
            args.push(format!("-header-filter={escaped}"));
        }
        (None, true) => {}
    }

    if let Some(dir) = compile_commands {
        args.push(format!("-p={}", dir.display()));
    }

    args.extend(config.extra_args.iter().cloned());
    args.extend(options.extra_args.iter().cloned());
    args.extend(files.iter().map(|f| f.display().to_string()));

    args
}
