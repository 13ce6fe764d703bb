// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TidyscanError {
    #[error("clang-tidy not found or not runnable at '{}': {detail}", path.display())]
    ToolNotFound { path: PathBuf, detail: String },

    #[error("clang-tidy produced no usable output:\n{stderr}")]
    ToolFailed { stderr: String },

    #[error("no C/C++ source files matched the requested paths")]
    NoMatchingFiles,

    #[error("I/O error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("invalid tidyscan.toml: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TidyscanError>;

// Allow `?` on std::io::Error by converting to TidyscanError::Io with unknown path.
impl From<std::io::Error> for TidyscanError {
    fn from(source: std::io::Error) -> Self {
        TidyscanError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
