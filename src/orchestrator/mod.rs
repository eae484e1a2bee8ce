//! Fixup orchestration: Discovery -> Rewriting -> ScriptPatching -> Postprocess
//! -> Staging -> Toolchain.
//!
//! Every phase runs to completion before the next one starts and every failure
//! ends the run. There is no rollback: a failed run leaves the generated files
//! partially rewritten and the HLS compiler is expected to regenerate them.

pub mod executor;
pub mod phases;
pub mod state;

use std::path::{Path, PathBuf};

pub use executor::{run_driver_scripts, QsysScript, ToolchainRunner};
pub use state::{FixupPhase, FixupReport, FixupState};

use crate::config::FixupConfig;
use crate::error::Result;
use crate::kernel::patcher::SystemPatcher;

/// Runs the whole fixup pipeline for one HLS project.
pub struct FixupOrchestrator {
    config: FixupConfig,

    /// `<work_dir>/<project>`
    project_dir: PathBuf,

    runner: Box<dyn ToolchainRunner>,

    state: FixupState,
}

impl FixupOrchestrator {
    /// Orchestrator with the production toolchain from `config`.
    pub fn new(config: FixupConfig, work_dir: &Path, project: &str) -> Self {
        let runner = Box::new(QsysScript::from_config(&config.toolchain));
        Self::with_runner(config, work_dir, project, runner)
    }

    pub fn with_runner(
        config: FixupConfig,
        work_dir: &Path,
        project: &str,
        runner: Box<dyn ToolchainRunner>,
    ) -> Self {
        FixupOrchestrator {
            config,
            project_dir: work_dir.join(project),
            runner,
            state: FixupState::new(project),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn current_phase(&self) -> FixupPhase {
        self.state.phase
    }

    pub fn report(&self) -> FixupReport {
        self.state.to_report()
    }

    /// Run all phases. On failure the state is marked failed and the error returned.
    pub fn run(&mut self) -> Result<FixupReport> {
        log::info!(
            "[Orchestrator] Fixing up project '{}' in {}",
            self.state.project,
            self.project_dir.display()
        );

        match self.execute() {
            Ok(()) => {
                log::info!(
                    "[Orchestrator] Completed in {} ms",
                    self.state.elapsed().as_millis()
                );
                Ok(self.report())
            }
            Err(e) => {
                log::error!("[Orchestrator] Phase {} failed: {}", self.state.phase, e);
                self.state.record_error(&e);
                Err(e)
            }
        }
    }

    fn execute(&mut self) -> Result<()> {
        let patcher = SystemPatcher::new(self.project_dir.clone(), self.state.project.clone());

        let kernels = patcher.discover_kernels()?;
        if kernels.is_empty() {
            log::warn!("[Orchestrator] No kernels found, generated files keep their ports");
        }

        self.state.transition_to(FixupPhase::Rewriting)?;
        let rewrite = patcher.rewrite_system_verilog(&kernels, &self.config)?;
        self.state.tallies = rewrite.tallies;
        self.state.totals = rewrite.totals;

        self.state.transition_to(FixupPhase::ScriptPatching)?;
        patcher.patch_hw_tcl(self.state.totals, &self.config.bus)?;

        self.state.transition_to(FixupPhase::Postprocess)?;
        let summary = phases::postprocess_project(&self.project_dir)?;
        self.state.partition_removed = summary.partition_removed;
        self.state.directives_stripped = summary.directives_stripped;

        self.state.transition_to(FixupPhase::Staging)?;
        let svm_common = self.config.resolve_svm_common_dir()?;
        phases::stage_ip_components(&svm_common, &self.project_dir)?;
        phases::stage_driver_scripts(&svm_common, &self.project_dir, &self.config.toolchain)?;

        self.state.transition_to(FixupPhase::Toolchain)?;
        run_driver_scripts(
            self.runner.as_ref(),
            &self.project_dir,
            &self.config.toolchain,
            &self.state.project,
            self.state.totals,
        )?;

        self.state.transition_to(FixupPhase::Completed)?;
        Ok(())
    }
}
