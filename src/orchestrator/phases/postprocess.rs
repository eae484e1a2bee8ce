//! Postprocess: make the project ready for an incremental system update.
//!
//! - the cached interface partition is deleted so the toolchain regenerates it
//! - `add_*` directives are dropped from `system.tcl`, so the integration tool
//!   is not told to add components or connections that already exist

use std::fs;
use std::io;
use std::path::Path;

use crate::error::PatchError;
use crate::kernel::patcher::{LineBuffer, PatchResult};

pub const PARTITION_ARTIFACT: &str = "acl_iface_partition.qxp";
pub const SYSTEM_SCRIPT: &str = "system.tcl";
const ADD_DIRECTIVE_PREFIX: &str = "add_";

/// Delete `<project_dir>/acl_iface_partition.qxp`.
///
/// Returns whether a file was removed; an absent artifact is not an error.
pub fn remove_partition_artifact(project_dir: &Path) -> PatchResult<bool> {
    let path = project_dir.join(PARTITION_ARTIFACT);
    match fs::remove_file(&path) {
        Ok(()) => {
            log::info!("[Postprocess] Removed stale partition {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("[Postprocess] No partition to remove at {}", path.display());
            Ok(false)
        }
        Err(e) => Err(PatchError::Io { path, source: e }),
    }
}

/// Lines of `buffer` that do not start with `add_`
pub fn strip_add_directives(buffer: &LineBuffer) -> (LineBuffer, usize) {
    let kept: Vec<String> = buffer
        .lines()
        .iter()
        .filter(|line| !line.starts_with(ADD_DIRECTIVE_PREFIX))
        .cloned()
        .collect();
    let removed = buffer.len() - kept.len();
    (buffer.with_lines(kept), removed)
}

/// Strip `add_*` directives from `<project_dir>/system.tcl` in place.
pub fn strip_system_script(project_dir: &Path) -> PatchResult<usize> {
    let path = project_dir.join(SYSTEM_SCRIPT);
    let buffer = LineBuffer::read(&path)?;
    let (stripped, removed) = strip_add_directives(&buffer);
    stripped.write(&path)?;

    log::info!("[Postprocess] Dropped {} add_ directives from {}", removed, path.display());
    Ok(removed)
}

/// Outcome of the postprocess phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostprocessSummary {
    pub partition_removed: bool,
    pub directives_stripped: usize,
}

/// Run both postprocess steps on one project directory.
pub fn postprocess_project(project_dir: &Path) -> PatchResult<PostprocessSummary> {
    let partition_removed = remove_partition_artifact(project_dir)?;
    let directives_stripped = strip_system_script(project_dir)?;
    Ok(PostprocessSummary {
        partition_removed,
        directives_stripped,
    })
}
