//! Unified error type hierarchy for the SVM fixup pipeline
//!
//! Provides structured error handling with InputError, PatchError, ToolchainError,
//! ConfigError, StagingError, and the aggregating FixupError.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Command-line input errors.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Unrecognised file type: {}", .0.display())]
    UnrecognisedFileType(PathBuf),
}

/// Generated-file rewriting errors.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Invalid regex pattern: {0}")]
    RegexInvalid(String),

    #[error("Patch target file not found: {0}")]
    FileNotFound(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A computed port index, array dimension or port count went negative.
    /// The generated file no longer matches the layout the rewriter assumes
    /// (SVM ports occupying the lowest indices of the write-port array).
    #[error("Structural assumption violated: {0}")]
    StructuralAssumption(String),
}

/// External toolchain invocation errors.
#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Toolchain invocation failed for '{script}' (exit status: {})", describe_status(.status))]
    InvocationFailed { script: String, status: Option<i32> },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Errors while staging bundled IP and driver scripts into the project tree.
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Bundled asset missing: {}", .0.display())]
    AssetMissing(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Top-level error for a fixup run. Every variant is fatal to the run.
#[derive(Error, Debug)]
pub enum FixupError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidPhaseTransition { from: String, to: String },
}

impl FixupError {
    /// Process exit status for this error: 2 for rejected input, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            FixupError::Input(_) => 2,
            _ => 1,
        }
    }
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, FixupError>;
