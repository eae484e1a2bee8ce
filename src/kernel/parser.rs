//! Kernel discovery in the generated top-level description file.
//!
//! The HLS compiler emits one `<kernel>_sys_cycle_time` module per kernel into
//! `<project>/<project>.v`. Those module headers are the only reliable list of
//! kernels in the design, so they drive every later pass.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::patcher::{LineBuffer, PatchResult};
use crate::models::Kernel;

const CYCLE_TIME_SUFFIX: &str = "_sys_cycle_time";

static CYCLE_TIME_MODULE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^module\s+([A-Za-z_0-9]+)_sys_cycle_time\s*$")
        .expect("Invalid cycle time module regex")
});

/// Extract the ordered, de-duplicated kernel names from description text.
///
/// Only lines that start with `module` and end with `_sys_cycle_time` are
/// considered. No matching line yields an empty list.
pub fn parse_kernels<S: AsRef<str>>(lines: &[S]) -> Vec<Kernel> {
    let mut kernels: Vec<Kernel> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if !line.starts_with("module") || !line.trim_end().ends_with(CYCLE_TIME_SUFFIX) {
            continue;
        }

        match CYCLE_TIME_MODULE_REGEX.captures(line) {
            Some(caps) => {
                let kernel = Kernel::new(&caps[1]);
                if !kernels.contains(&kernel) {
                    kernels.push(kernel);
                }
            }
            None => {
                log::warn!("[Discover] Skipping malformed cycle time module header: {}", line);
            }
        }
    }

    kernels
}

/// Read `<project_dir>/<project>.v` and list the kernels it declares.
///
/// A missing file is fatal; there is nothing to recover from.
pub fn discover_kernels(project_dir: &Path, project: &str) -> PatchResult<Vec<Kernel>> {
    let path = project_dir.join(format!("{}.v", project));
    let buffer = LineBuffer::read(&path)?;
    let kernels = parse_kernels(buffer.lines());

    log::info!("[Discover] Detected kernels: {}", kernels.len());
    for kernel in &kernels {
        log::info!("[Discover]   {}", kernel);
    }

    Ok(kernels)
}
