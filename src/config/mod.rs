// src/config/mod.rs
pub mod io;
pub mod types;

use std::path::Path;

pub use self::types::{Config, ExtraArgs, OutputFormat, RunOptions, TidyscanToml};
use crate::error::Result;

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with `tidyscan.toml` under `root` applied, when one
    /// exists. Also fills unset fields of `options` from the file's
    /// defaults; values the caller already set are left alone.
    ///
    /// # Errors
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load(root: &Path, options: &mut RunOptions) -> Result<Self> {
        let mut config = Self::new();
        if let Some(toml) = io::load_toml(root)? {
            io::apply_toml_defaults(options, &toml);
            io::apply_toml(&mut config, toml);
        }
        Ok(config)
    }
}
