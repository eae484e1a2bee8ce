//! Configuration for the SVM fixup pipeline.
//!
//! Every component receives a `&FixupConfig` explicitly; there is no
//! module-level debug switch. Defaults reproduce the constants the generated
//! system and the bundled `svm_system.tcl` driver agree on.
//!
//! # Module Structure
//!
//! - `loader`: TOML loading, lookup of the per-user config file, CLI input validation

pub mod loader;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External (output side) widths of an SVM port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusWidths {
    pub data_width: u32,
    pub addr_width: u32,
    pub byteenable_width: u32,
    pub burstcount_width: u32,
}

impl Default for BusWidths {
    fn default() -> Self {
        BusWidths {
            data_width: 128,
            addr_width: 32,
            byteenable_width: 16,
            burstcount_width: 5,
        }
    }
}

/// Whether atomic / lock-service ports are converted alongside standard ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockServiceMode {
    /// Lock-service ports are never counted; their port maps share the
    /// standard remap target.
    #[default]
    Disabled,
    Enabled,
}

impl LockServiceMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, LockServiceMode::Enabled)
    }
}

/// External Qsys toolchain settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Program invoked for both driver scripts
    pub program: String,
    /// Interface partition driver script (run first, no arguments)
    pub iface_script: String,
    /// System driver script (run second with project name and port totals)
    pub system_script: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        ToolchainConfig {
            program: "qsys-script".to_string(),
            iface_script: "iface.tcl".to_string(),
            system_script: "svm_system.tcl".to_string(),
        }
    }
}

/// Complete run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixupConfig {
    /// AVM ports generated per load/store unit in the kernel wrapper
    pub avm_ports_per_lsu: u32,
    pub lock_service: LockServiceMode,
    /// Root holding `rtl_src/` and `scripts/`; resolved from the executable when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svm_common_dir: Option<PathBuf>,
    /// Trace every rewritten line at debug level
    pub verbose: bool,
    /// Also append log lines to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    // Tables last so the TOML form stays valid
    pub bus: BusWidths,
    pub toolchain: ToolchainConfig,
}

impl Default for FixupConfig {
    fn default() -> Self {
        FixupConfig {
            avm_ports_per_lsu: 3,
            lock_service: LockServiceMode::Disabled,
            svm_common_dir: None,
            verbose: false,
            log_file: None,
            bus: BusWidths::default(),
            toolchain: ToolchainConfig::default(),
        }
    }
}

impl FixupConfig {
    /// Reject widths or port counts the rewriter cannot render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let widths = [
            ("bus.data_width", self.bus.data_width),
            ("bus.addr_width", self.bus.addr_width),
            ("bus.byteenable_width", self.bus.byteenable_width),
            ("bus.burstcount_width", self.bus.burstcount_width),
        ];
        for (name, value) in widths {
            if value == 0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if self.avm_ports_per_lsu == 0 {
            return Err(ConfigError::ValidationFailed(
                "avm_ports_per_lsu must be greater than 0".to_string(),
            ));
        }

        if self.toolchain.program.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "toolchain.program cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Directory holding the bundled `rtl_src/` and `scripts/` trees.
    ///
    /// Falls back to the parent of the directory containing the running executable.
    pub fn resolve_svm_common_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.svm_common_dir {
            return Ok(dir.clone());
        }

        let exe = std::env::current_exe()?;
        exe.parent()
            .and_then(|bin_dir| bin_dir.parent())
            .map(|root| root.to_path_buf())
            .ok_or_else(|| {
                ConfigError::ValidationFailed(format!(
                    "Cannot derive svm_common_dir from executable path {}",
                    exe.display()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_generated_system() {
        let config = FixupConfig::default();
        assert_eq!(config.bus.data_width, 128);
        assert_eq!(config.bus.addr_width, 32);
        assert_eq!(config.bus.byteenable_width, 16);
        assert_eq!(config.bus.burstcount_width, 5);
        assert_eq!(config.avm_ports_per_lsu, 3);
        assert_eq!(config.lock_service, LockServiceMode::Disabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut config = FixupConfig::default();
        config.bus.addr_width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(msg)) if msg.contains("bus.addr_width")
        ));
    }

    #[test]
    fn test_explicit_svm_common_dir_wins() {
        let config = FixupConfig {
            svm_common_dir: Some(PathBuf::from("/opt/svm_common")),
            ..FixupConfig::default()
        };
        assert_eq!(
            config.resolve_svm_common_dir().unwrap(),
            PathBuf::from("/opt/svm_common")
        );
    }
}
