//! End-to-end scan pipeline: filter, batch, schedule, merge, parse, enrich.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::batch;
use crate::config::{Config, RunOptions};
use crate::error::{Result, TidyscanError};
use crate::invoke::{Invoker, Task};
use crate::parse;
use crate::pool;
use crate::report::ReportData;

/// Runs clang-tidy over `files` and assembles the report.
///
/// Per-batch failures (start failure, timeout, empty output) are isolated:
/// the run only fails when no batch produced usable stdout, in which case
/// the collected stderr is surfaced. `on_progress` receives
/// `(completed, total)` batch counts.
///
/// # Errors
/// Returns `NoMatchingFiles` when nothing in `files` has a recognized
/// extension, or `ToolFailed` when the tool produced no usable output.
pub fn scan_files<F>(
    root: &Path,
    files: &[PathBuf],
    options: &RunOptions,
    config: &Config,
    on_progress: &F,
) -> Result<ReportData>
where
    F: Fn(usize, usize) + Sync,
{
    let start = Instant::now();

    let sources = batch::filter_sources(files);
    if sources.is_empty() {
        return Err(TidyscanError::NoMatchingFiles);
    }

    let jobs = batch::effective_jobs(options.parallel.or(config.parallel_jobs));
    let compile_commands = batch::resolve_compile_commands(root, config);
    if compile_commands.is_none() && config.verbose {
        eprintln!(
            "WARN: no compilation database (compile_commands.json) found under {}; clang-tidy may only partially work",
            root.display()
        );
    }

    let batches = batch::plan_batches(&sources, jobs);
    let tasks: Vec<Task> = batches
        .iter()
        .map(|batch_files| {
            let args = batch::build_args(
                root,
                config,
                options,
                compile_commands.as_deref(),
                batch_files,
            );
            Task::new(config.executable_path.clone(), args)
                .with_working_dir(root.to_path_buf())
        })
        .collect();

    let invoker = Invoker::new(config.timeout);
    let results = pool::run_pool(&tasks, &invoker, jobs, on_progress);

    // Merge stdout in task order. A batch without output failed, whatever
    // its exit code claims; clang-tidy signals findings via non-zero exits.
    let mut merged = String::new();
    for (index, result) in results.iter().enumerate() {
        if result.has_output() {
            merged.push_str(result.stdout());
            if !merged.ends_with('\n') {
                merged.push('\n');
            }
        } else if config.verbose {
            eprintln!(
                "WARN: batch {}/{} produced no output (exit code {})",
                index + 1,
                results.len(),
                result.exit_code()
            );
        }
    }

    if merged.trim().is_empty() {
        let stderr = results
            .iter()
            .map(|r| r.stderr().trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(TidyscanError::ToolFailed { stderr });
    }

    let outcome = parse::parse_output(&merged);
    let mut diagnostics = outcome.diagnostics;
    parse::enrich(&mut diagnostics, config.verbose);

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(ReportData::new(
        diagnostics,
        sources.len(),
        outcome.dropped,
        duration_ms,
    ))
}
