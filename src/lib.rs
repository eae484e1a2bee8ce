//! SVM fixup for HLS-generated FPGA systems
//!
//! This crate post-processes the RTL and Qsys files an OpenCL HLS compiler
//! generates for a kernel project, exporting every host-memory-bridge port of
//! every kernel as an external shared-virtual-memory port with a bus adapter,
//! then driving the system integration tool to wire the new ports up.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core data structures (kernels, port tallies, AVM sub-port catalogue)
//! - **config**: Run configuration, TOML loading and CLI input validation
//! - **kernel**: Kernel discovery and the generated-file patcher
//! - **orchestrator**: Phase sequencing, staging and external toolchain execution
//! - **log_collector**: `log` backend writing timestamped lines

// Core foundational modules
pub mod error;
pub mod models;

// Configuration management module
pub mod config;

// Timestamped logging backend
pub mod log_collector;

// Kernel discovery and generated-file patching
pub mod kernel;

// Phase sequencing and toolchain execution
pub mod orchestrator;

// Re-export the log crate for macro usage
pub use log;

// Re-export log collector for use throughout the system
pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

// Re-export error types for easy access
pub use error::{
    ConfigError, FixupError, InputError, PatchError, Result, StagingError, ToolchainError,
};

// Re-export model types for easy access
pub use models::{Direction, Kernel, PortCategory, PortTally, PortTotals, SubPort};

pub use config::{BusWidths, FixupConfig, LockServiceMode, ToolchainConfig};
pub use kernel::patcher::{LineBuffer, SystemPatcher, SystemRewrite};
pub use orchestrator::{FixupOrchestrator, FixupPhase, FixupReport, QsysScript, ToolchainRunner};
