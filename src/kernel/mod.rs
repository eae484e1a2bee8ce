//! Generated kernel project handling
//!
//! - `parser`: kernel discovery from `<project>.v`
//! - `patcher`: structural rewrite of `<project>_system.v` and
//!   `<project>_system_hw.tcl`

pub mod parser;
pub mod patcher;

pub use parser::{discover_kernels, parse_kernels};
pub use patcher::{PatchResult, SystemPatcher};
