//! Config file loader and CLI input validation.

use super::FixupConfig;
use crate::error::{ConfigError, InputError};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension required on the kernel source passed on the command line.
pub const KERNEL_SOURCE_EXTENSION: &str = "cl";

/// Get the per-user config path: <config dir>/svm-fixup/config.toml
pub fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("svm-fixup").join("config.toml"))
}

/// Load config from a TOML file.
pub fn load_config_from_file(path: &Path) -> Result<FixupConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Configuration file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let config: FixupConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save config to a TOML file.
pub fn save_config_to_file(config: &FixupConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::ValidationFailed(format!("Cannot serialize config: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}

/// Resolve the run configuration.
///
/// An explicit path must exist. Without one, the per-user config file is used
/// when present, otherwise the defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<FixupConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_from_file(path);
    }

    match get_user_config_path() {
        Some(path) if path.is_file() => load_config_from_file(&path),
        _ => Ok(FixupConfig::default()),
    }
}

/// Validate the kernel source argument and derive the project name from it.
///
/// The file must exist and carry the `.cl` extension; the project name is the
/// file stem (`path/to/vector_add.cl` -> `vector_add`).
pub fn project_name_from_source(cl_file: &Path) -> Result<String, InputError> {
    let has_extension = cl_file
        .extension()
        .map(|ext| ext == KERNEL_SOURCE_EXTENSION)
        .unwrap_or(false);

    if !cl_file.is_file() || !has_extension {
        return Err(InputError::UnrecognisedFileType(cl_file.to_path_buf()));
    }

    cl_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| InputError::UnrecognisedFileType(cl_file.to_path_buf()))
}
