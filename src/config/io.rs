//! Loading `tidyscan.toml` from a project root.

use std::fs;
use std::path::Path;

use crate::error::{Result, TidyscanError};

use super::types::{Config, RunOptions, TidyscanToml};

pub const CONFIG_FILE: &str = "tidyscan.toml";

/// Reads and parses `tidyscan.toml` under `root`, if present.
///
/// A missing file is not an error; a present-but-invalid file is.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_toml(root: &Path) -> Result<Option<TidyscanToml>> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|source| TidyscanError::Io {
        source,
        path: path.clone(),
    })?;
    let parsed: TidyscanToml = toml::from_str(&content)?;
    Ok(Some(parsed))
}

/// Merges file-level settings into a `Config`. CLI-provided values are
/// applied by the caller afterwards and win over the file.
pub fn apply_toml(config: &mut Config, toml: TidyscanToml) {
    if let Some(exe) = toml.executable {
        config.executable_path = exe;
    }
    if let Some(dir) = toml.compile_commands {
        config.compile_commands_path = Some(dir);
    }
    if let Some(jobs) = toml.jobs {
        config.parallel_jobs = Some(jobs);
    }
    if let Some(secs) = toml.timeout_secs {
        config.timeout = Some(std::time::Duration::from_secs(secs));
    }
    if let Some(extra) = toml.extra_args {
        config.extra_args = extra.into_vec();
    }
}

/// Fills unset run options from file-level defaults.
pub fn apply_toml_defaults(options: &mut RunOptions, toml: &TidyscanToml) {
    if options.checks.is_none() {
        options.checks.clone_from(&toml.checks);
    }
    if options.header_filter.is_none() {
        options.header_filter.clone_from(&toml.header_filter);
    }
}
