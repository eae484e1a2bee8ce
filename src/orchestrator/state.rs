//! Run state and phase tracking.
//!
//! **Architecture**:
//! - `FixupPhase`: discrete steps of one fixup run, in execution order
//! - `FixupState`: current phase plus everything the run has learned so far
//! - `FixupReport`: serializable summary handed back to the caller
//!
//! The orchestrator is the only writer; transitions outside
//! `FixupPhase::valid_next_phases` are rejected.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::error::FixupError;
use crate::models::{Kernel, PortTally, PortTotals};

/// Fixup phase enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixupPhase {
    /// Read `<project>.v` and list the kernels
    Discovery,

    /// Rewrite `<project>_system.v`
    Rewriting,

    /// Declare the new interfaces in `<project>_system_hw.tcl`
    ScriptPatching,

    /// Drop the stale partition and strip `add_` directives from `system.tcl`
    Postprocess,

    /// Copy bundled IP and driver scripts into the project
    Staging,

    /// Run the system integration tool over the driver scripts
    Toolchain,

    /// All phases finished
    Completed,

    /// A phase failed; files may be partially rewritten
    Failed,
}

impl FixupPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixupPhase::Discovery => "discovery",
            FixupPhase::Rewriting => "rewriting",
            FixupPhase::ScriptPatching => "script_patching",
            FixupPhase::Postprocess => "postprocess",
            FixupPhase::Staging => "staging",
            FixupPhase::Toolchain => "toolchain",
            FixupPhase::Completed => "completed",
            FixupPhase::Failed => "failed",
        }
    }

    /// Get all valid phase transitions FROM this phase.
    pub fn valid_next_phases(&self) -> Vec<FixupPhase> {
        match self {
            FixupPhase::Discovery => vec![FixupPhase::Rewriting, FixupPhase::Failed],
            FixupPhase::Rewriting => vec![FixupPhase::ScriptPatching, FixupPhase::Failed],
            FixupPhase::ScriptPatching => vec![FixupPhase::Postprocess, FixupPhase::Failed],
            FixupPhase::Postprocess => vec![FixupPhase::Staging, FixupPhase::Failed],
            FixupPhase::Staging => vec![FixupPhase::Toolchain, FixupPhase::Failed],
            FixupPhase::Toolchain => vec![FixupPhase::Completed, FixupPhase::Failed],
            FixupPhase::Completed => vec![],
            // No recovery: inputs have to be regenerated before another run
            FixupPhase::Failed => vec![],
        }
    }

    pub fn can_transition_to(&self, next: FixupPhase) -> bool {
        self.valid_next_phases().contains(&next)
    }
}

impl std::fmt::Display for FixupPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kernel tally line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelReport {
    pub kernel: Kernel,
    #[serde(flatten)]
    pub ports: PortTally,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct FixupReport {
    pub project: String,
    pub kernels: Vec<KernelReport>,
    pub totals: PortTotals,
    pub phase: FixupPhase,
    pub partition_removed: bool,
    pub directives_stripped: usize,
    pub elapsed_ms: u128,
    /// Display form of the error that stopped the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Mutable state of a run in progress.
#[derive(Debug, Clone)]
pub struct FixupState {
    pub project: String,
    pub phase: FixupPhase,
    pub tallies: Vec<(Kernel, PortTally)>,
    pub totals: PortTotals,
    pub partition_removed: bool,
    pub directives_stripped: usize,
    pub error: Option<String>,
    start_time: Instant,
}

impl FixupState {
    pub fn new(project: impl Into<String>) -> Self {
        FixupState {
            project: project.into(),
            phase: FixupPhase::Discovery,
            tallies: Vec::new(),
            totals: PortTotals::default(),
            partition_removed: false,
            directives_stripped: 0,
            error: None,
            start_time: Instant::now(),
        }
    }

    /// Attempt to transition to the next phase.
    pub fn transition_to(&mut self, next_phase: FixupPhase) -> Result<(), FixupError> {
        if !self.phase.can_transition_to(next_phase) {
            return Err(FixupError::InvalidPhaseTransition {
                from: self.phase.as_str().to_string(),
                to: next_phase.as_str().to_string(),
            });
        }
        log::debug!("[Orchestrator] Phase {} -> {}", self.phase, next_phase);
        self.phase = next_phase;
        Ok(())
    }

    /// Record the error and mark the run as failed.
    pub fn record_error(&mut self, error: &FixupError) {
        self.error = Some(error.to_string());
        self.phase = FixupPhase::Failed;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn to_report(&self) -> FixupReport {
        FixupReport {
            project: self.project.clone(),
            kernels: self
                .tallies
                .iter()
                .map(|(kernel, ports)| KernelReport {
                    kernel: kernel.clone(),
                    ports: *ports,
                })
                .collect(),
            totals: self.totals,
            phase: self.phase,
            partition_removed: self.partition_removed,
            directives_stripped: self.directives_stripped,
            elapsed_ms: self.elapsed().as_millis(),
            error: self.error.clone(),
        }
    }
}
