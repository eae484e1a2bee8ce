//! In-place rewriting of the generated system files.
//!
//! [`SystemPatcher`] owns the paths of one project directory and applies the
//! two structural rewrites the SVM port export needs:
//! - `<project>_system.v`: new ports, adapters and relinked port maps
//!   (see [`verilog`])
//! - `<project>_system_hw.tcl`: matching Qsys interface declarations
//!   (see [`hw_tcl`])
//!
//! Every pass reads a whole file into a [`LineBuffer`], builds a new buffer and
//! writes it back only after the pass succeeded.

use std::path::{Path, PathBuf};

use crate::error::PatchError;
use crate::models::Kernel;

pub mod hw_tcl;
pub mod lines;
pub mod patterns;
pub mod templates;
pub mod verilog;


pub use hw_tcl::patch_hw_tcl_lines;
pub use lines::{LineBuffer, LineEnding, Lookback};
pub use verilog::{rewrite_system, SystemRewrite};

/// Result type for patching operations
pub type PatchResult<T> = std::result::Result<T, PatchError>;

/// Patcher for the generated files of one HLS project directory
#[derive(Debug, Clone)]
pub struct SystemPatcher {
    /// `<work_dir>/<project>`
    project_dir: PathBuf,
    project: String,
}

impl SystemPatcher {
    pub fn new(project_dir: PathBuf, project: impl Into<String>) -> Self {
        SystemPatcher {
            project_dir,
            project: project.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// `<project>.v`, the kernel listing
    pub fn top_verilog_path(&self) -> PathBuf {
        self.project_dir.join(format!("{}.v", self.project))
    }

    /// `<project>_system.v`
    pub fn system_verilog_path(&self) -> PathBuf {
        self.project_dir.join(format!("{}_system.v", self.project))
    }

    /// `<project>_system_hw.tcl`
    pub fn system_hw_tcl_path(&self) -> PathBuf {
        self.project_dir.join(format!("{}_system_hw.tcl", self.project))
    }

    /// Kernels declared in `<project>.v`, in file order
    pub fn discover_kernels(&self) -> PatchResult<Vec<Kernel>> {
        super::parser::discover_kernels(&self.project_dir, &self.project)
    }
}
