use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use tidyscan_core::config::{Config, OutputFormat, RunOptions};
use tidyscan_core::error::TidyscanError;
use tidyscan_core::{discovery, invoke, reporting, run};

#[derive(Parser)]
#[command(name = "tidyscan", version, about = "clang-tidy runner with structured reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run clang-tidy across files or directories (default: current dir)
    Scan(ScanArgs),
    /// Check that clang-tidy is available and report its version
    Probe {
        /// Path to the clang-tidy executable
        #[arg(long, value_name = "PATH")]
        executable: Option<PathBuf>,
    },
}

#[derive(clap::Args, Default)]
struct ScanArgs {
    /// Files or directories to analyze
    paths: Vec<PathBuf>,

    /// Check selection glob list (clang-tidy -checks=)
    #[arg(long)]
    checks: Option<String>,

    /// Header filter regex (clang-tidy -header-filter=)
    #[arg(long)]
    header_filter: Option<String>,

    /// Extra argument passed through verbatim (repeatable)
    #[arg(long = "extra-arg", value_name = "ARG")]
    extra_args: Vec<String>,

    /// Parallel clang-tidy processes (capped at 8)
    #[arg(long, short)]
    jobs: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Path to the clang-tidy executable
    #[arg(long, value_name = "PATH")]
    executable: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Some(Commands::Probe { executable }) => cmd_probe(executable)?,
        Some(Commands::Scan(args)) => cmd_scan(args)?,
        None => cmd_scan(ScanArgs::default())?,
    };
    process::exit(exit_code);
}

fn cmd_probe(executable: Option<PathBuf>) -> Result<i32> {
    let root = std::env::current_dir()?;
    let mut options = RunOptions::default();
    let mut config = Config::load(&root, &mut options)?;
    if let Some(exe) = executable {
        config.executable_path = exe;
    }

    match invoke::probe(&config.executable_path) {
        Ok(version) => {
            println!("{} {version}", "OK".green().bold());
            Ok(0)
        }
        Err(e) => {
            eprintln!("{} {e}", "X".red().bold());
            Ok(2)
        }
    }
}

fn cmd_scan(args: ScanArgs) -> Result<i32> {
    let root = std::env::current_dir()?;

    let mut options = RunOptions {
        checks: args.checks,
        header_filter: args.header_filter,
        extra_args: args.extra_args,
        output_format: args.format,
        parallel: args.jobs,
    };
    let mut config = Config::load(&root, &mut options)?;
    if let Some(exe) = args.executable {
        config.executable_path = exe;
    }
    if args.verbose {
        config.verbose = true;
    }

    let files = expand_paths(&root, &args.paths, config.verbose);

    let show_progress = io::stderr().is_terminal() && options.output_format == OutputFormat::Text;
    let on_progress = move |done: usize, total: usize| {
        if show_progress {
            eprint!("\r  analyzing batch {done}/{total}");
            if done == total {
                eprint!("\r\x1B[2K");
            }
            let _ = io::stderr().flush();
        }
    };

    let report = match run::scan_files(&root, &files, &options, &config, &on_progress) {
        Ok(report) => report,
        Err(e) => return Ok(report_scan_error(&e)),
    };

    match options.output_format {
        OutputFormat::Text => reporting::print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.error_count() > 0 { 1 } else { 0 })
}

/// Directories are walked for C/C++ sources; explicit files are taken as
/// given (the pipeline filters unrecognized extensions itself).
fn expand_paths(root: &Path, paths: &[PathBuf], verbose: bool) -> Vec<PathBuf> {
    let requested: Vec<PathBuf> = if paths.is_empty() {
        vec![root.to_path_buf()]
    } else {
        paths
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { root.join(p) })
            .collect()
    };

    let mut files = Vec::new();
    for path in requested {
        if path.is_dir() {
            files.extend(discovery::discover(&path, verbose));
        } else {
            files.push(path);
        }
    }
    files
}

fn report_scan_error(error: &TidyscanError) -> i32 {
    eprintln!("{} {error}", "X".red().bold());
    if let TidyscanError::ToolFailed { .. } = error {
        eprintln!(
            "{}",
            "hint: check `tidyscan probe`, and that a compile_commands.json exists (set compile_commands in tidyscan.toml)"
                .dimmed()
        );
    }
    2
}
