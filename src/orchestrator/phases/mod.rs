//! Orchestrator phases that touch the project tree outside the patcher:
//! - **Postprocess** (`postprocess`): stale partition removal and `add_` directive strip
//! - **Staging** (`staging`): bundled IP components and driver scripts
//!
//! Each phase is independently testable and used by both binaries.

pub mod postprocess;
pub mod staging;

pub use postprocess::{postprocess_project, PostprocessSummary};
pub use staging::{stage_driver_scripts, stage_ip_components};
