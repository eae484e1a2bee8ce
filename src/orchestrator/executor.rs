//! External toolchain execution.
//!
//! The system integration tool is driven through two Tcl driver scripts that
//! have been staged into the project directory:
//! - the interface script, run without arguments
//! - the system script, run with the project name and both new-port totals
//!
//! Execution sits behind [`ToolchainRunner`] so the pipeline can run against a
//! recording fake in tests.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config::ToolchainConfig;
use crate::error::ToolchainError;
use crate::models::PortTotals;

/// Runs one driver script with the project directory as working directory.
pub trait ToolchainRunner {
    fn run_script(&self, project_dir: &Path, script: &str, args: &[String]) -> Result<(), ToolchainError>;
}

/// `qsys-script --script=<script> [args...]`, spawned directly without a shell.
#[derive(Debug, Clone)]
pub struct QsysScript {
    program: String,
}

impl QsysScript {
    pub fn new(program: impl Into<String>) -> Self {
        QsysScript {
            program: program.into(),
        }
    }

    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::new(config.program.clone())
    }
}

impl ToolchainRunner for QsysScript {
    fn run_script(&self, project_dir: &Path, script: &str, args: &[String]) -> Result<(), ToolchainError> {
        log::info!(
            "[Toolchain] Running {} --script={} {} in {}",
            self.program,
            script,
            args.join(" "),
            project_dir.display()
        );

        let status = Command::new(&self.program)
            .arg(format!("--script={}", script))
            .args(args)
            .current_dir(project_dir)
            .status()
            .map_err(|e| ToolchainError::SpawnFailed {
                program: self.program.clone(),
                source: e,
            })?;

        if status.success() {
            log::info!("[Toolchain] {} finished", script);
            Ok(())
        } else {
            Err(ToolchainError::InvocationFailed {
                script: script.to_string(),
                status: status.code(),
            })
        }
    }
}

/// Script name and arguments of both invocations, in execution order.
pub fn driver_invocations(config: &ToolchainConfig, project: &str, totals: PortTotals) -> Vec<(String, Vec<String>)> {
    vec![
        (config.iface_script.clone(), Vec::new()),
        (
            config.system_script.clone(),
            vec![
                project.to_string(),
                totals.svm.to_string(),
                totals.lock_service.to_string(),
            ],
        ),
    ]
}

/// Run both driver scripts, then delete them from the project directory.
///
/// The scripts are deleted even when an invocation fails; the first failure is
/// returned after cleanup. A failed interface script skips the system script.
pub fn run_driver_scripts(
    runner: &dyn ToolchainRunner,
    project_dir: &Path,
    config: &ToolchainConfig,
    project: &str,
    totals: PortTotals,
) -> Result<(), ToolchainError> {
    let invocations = driver_invocations(config, project, totals);

    let outcome = invocations
        .iter()
        .try_for_each(|(script, args)| runner.run_script(project_dir, script, args));

    for (script, _) in &invocations {
        let path = project_dir.join(script);
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("[Toolchain] Failed to remove {}: {}", path.display(), e);
        }
    }

    outcome
}
