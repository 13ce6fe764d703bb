use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Output format for rendered reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Per-run options, typically assembled from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit check selection (clang-tidy `-checks=` glob list).
    pub checks: Option<String>,
    /// Explicit header filter regex.
    pub header_filter: Option<String>,
    /// Extra arguments appended verbatim after all computed flags.
    pub extra_args: Vec<String>,
    pub output_format: OutputFormat,
    /// Parallel job override; falls back to config, then host core count.
    pub parallel: Option<usize>,
}

/// Resolved tool configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path or name of the clang-tidy executable.
    pub executable_path: PathBuf,
    /// Directory containing compile_commands.json, if configured.
    pub compile_commands_path: Option<PathBuf>,
    /// Configured parallelism; None means derive from host core count.
    pub parallel_jobs: Option<usize>,
    /// Extra arguments from configuration, appended before run options' own.
    pub extra_args: Vec<String>,
    /// Per-process deadline; None disables timeout enforcement.
    pub timeout: Option<Duration>,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from("clang-tidy"),
            compile_commands_path: None,
            parallel_jobs: None,
            extra_args: Vec::new(),
            timeout: None,
            verbose: false,
        }
    }
}

/// Extra arguments in `tidyscan.toml` accept a single string (split with
/// shell quoting rules) or a list of pre-split strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraArgs {
    Single(String),
    List(Vec<String>),
}

impl ExtraArgs {
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(s) => shell_words::split(&s).unwrap_or_else(|_| vec![s]),
            Self::List(l) => l,
        }
    }
}

/// On-disk shape of `tidyscan.toml`. Every field is optional; missing
/// fields keep the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TidyscanToml {
    #[serde(default)]
    pub executable: Option<PathBuf>,
    #[serde(default)]
    pub compile_commands: Option<PathBuf>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub extra_args: Option<ExtraArgs>,
    #[serde(default)]
    pub checks: Option<String>,
    #[serde(default)]
    pub header_filter: Option<String>,
}
