//! Structural rewrite of `<project>_system.v`.
//!
//! The rewrite turns every host-memory-bridge AVM port of each kernel into an
//! exported SVM port. It runs as three kinds of passes over whole line buffers,
//! each pass producing a fresh buffer for the next one:
//!
//! 1. **count**: tally the bridge enable port maps inside the kernel's
//!    `<kernel>_top_wrapper` instance
//! 2. **insert** (once per kernel, on the previous kernel's output): extend the
//!    module port list, shrink the write-port array declarations, add wires and
//!    `bus_adaption` instances, redirect the bridge port maps to the new wires and
//!    lower the interconnect's `NUM_WR_PORT`
//! 3. **renumber** (after all kernels): shift every remaining write-array port map
//!    index down by the grand total of new ports
//!
//! The transform is single-use. Run on its own output it counts the redirected
//! port maps again and inserts a second set of ports.

use super::lines::{LineBuffer, Lookback};
use super::patterns::{
    KernelPatterns, SystemPatterns, BLANK_LINE_REGEX, CLOSE_PAREN_REGEX, ENDMODULE_REGEX,
    GENERIC_MAP_OPEN_REGEX, LSU_IC_TOP_REGEX, NUM_WR_PORT_REGEX, OPEN_PAREN_REGEX,
    WRITE_ARRAY_DECL_REGEX, WRITE_ARRAY_PORTMAP_REGEX,
};
use super::templates;
use super::PatchResult;
use crate::config::{FixupConfig, LockServiceMode};
use crate::error::PatchError;
use crate::models::{Kernel, PortCategory, PortTally, PortTotals};

const CATEGORIES: [PortCategory; 2] = [PortCategory::Svm, PortCategory::LockService];

/// Scan position relative to the `<project>_system` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleRegion {
    /// Before the module header
    Outside,
    /// Header seen, port list not opened yet
    Header,
    /// Between the bare `(` and `);` of the port list
    PortList,
    /// Body, before its first blank line
    BodyPreBlank,
    /// Body, first blank line already passed
    BodyPostBlank,
}

/// Region flags for one pass.
///
/// The component and generic-map regions are orthogonal to the module region:
/// they are only ever entered inside the module.
#[derive(Debug, Clone, Copy)]
struct ScanState {
    region: ModuleRegion,
    /// Inside the current kernel's `<kernel>_top_wrapper` instance
    in_component: bool,
    /// Inside (or anywhere after) the `lsu_ic_top` generic map
    in_generic_map: bool,
}

impl ScanState {
    fn new() -> Self {
        ScanState {
            region: ModuleRegion::Outside,
            in_component: false,
            in_generic_map: false,
        }
    }

    fn in_module(&self) -> bool {
        self.region != ModuleRegion::Outside
    }

    fn in_body(&self) -> bool {
        matches!(
            self.region,
            ModuleRegion::BodyPreBlank | ModuleRegion::BodyPostBlank
        )
    }

    fn on_module_header(&mut self) {
        if self.region == ModuleRegion::Outside {
            self.region = ModuleRegion::Header;
        }
    }

    /// `endmodule` does not leave the module region. The generated system file
    /// carries the system module last, so everything after its header is
    /// scanned as module content.
    // TODO: leave the module on `endmodule` once a generated file with a trailing
    // module after `<project>_system` is available to verify the index rewrites against.
    fn on_endmodule(&mut self) {}

    /// Enter or leave the kernel instance for this line.
    fn track_component(&mut self, line: &str, kernel: &KernelPatterns) {
        if self.in_module() && kernel.instance.is_match(line) {
            self.in_component = true;
        }
    }

    fn leave_component_on_close(&mut self, line: &str) {
        if self.in_component && CLOSE_PAREN_REGEX.is_match(line) {
            self.in_component = false;
        }
    }
}

/// Result of rewriting the system description.
#[derive(Debug, Clone)]
pub struct SystemRewrite {
    pub buffer: LineBuffer,
    /// Per-kernel tallies in discovery order
    pub tallies: Vec<(Kernel, PortTally)>,
    pub totals: PortTotals,
}

fn trace(config: &FixupConfig, rule: &str, before: &str, after: &str) {
    if config.verbose {
        log::debug!("[Rewrite] [{}] '{}' -> '{}'", rule, before.trim(), after.trim());
    }
}

/// `value - delta` or a structural-assumption error naming what went negative.
fn checked_shift(value: &str, delta: usize, what: &str) -> PatchResult<u64> {
    let parsed: u64 = value
        .parse()
        .map_err(|_| PatchError::StructuralAssumption(format!("{} '{}' is not a number", what, value)))?;
    parsed.checked_sub(delta as u64).ok_or_else(|| {
        PatchError::StructuralAssumption(format!(
            "{} {} minus {} new SVM ports is negative; SVM-related indices in the port array must start from 0",
            what, parsed, delta
        ))
    })
}

/// Pass 1: count the bridge ports to convert for one kernel.
///
/// Every enable port map inside the kernel instance is one AVM port. With the
/// lock service disabled the atomic tally stays 0.
pub fn count_kernel_ports(
    lines: &[String],
    system: &SystemPatterns,
    kernel: &KernelPatterns,
    config: &FixupConfig,
) -> PortTally {
    let mut state = ScanState::new();
    let mut tally = PortTally::default();

    for line in lines {
        if system.module_header.is_match(line) {
            state.on_module_header();
        }
        if state.in_module() && ENDMODULE_REGEX.is_match(line) {
            state.on_endmodule();
        }
        state.track_component(line, kernel);
        state.leave_component_on_close(line);

        if state.in_component && kernel.bridge_enable.is_match(line) {
            match config.lock_service {
                LockServiceMode::Enabled if kernel.atomic_enable.is_match(line) => {
                    tally.lock_service += 1
                }
                _ => tally.svm += 1,
            }
        }
    }

    tally
}

/// Close the port list: re-add the separator to the last existing port,
/// append the new port declarations, strip the separator from the final line.
fn close_port_list(out: &mut Lookback, tally: PortTally, config: &FixupConfig) {
    let last_port = out.held().unwrap_or_default().to_string();
    out.replace_held(format!("{},", last_port));

    for category in CATEGORIES {
        for index in 0..tally.count(category) {
            out.emit_block(templates::port_declarations(category, index, &config.bus));
        }
    }

    if let Some(last) = out.held() {
        let stripped = last.trim_end_matches(',').to_string();
        out.replace_held(stripped);
    }
}

/// `logic [..] avm_kernel_wr_x [N];` -> `[N - new ports]`
fn shrink_write_array(out: &mut Lookback, tally: PortTally, config: &FixupConfig) -> PatchResult<()> {
    let Some(held) = out.held() else {
        return Ok(());
    };
    let Some(caps) = WRITE_ARRAY_DECL_REGEX.captures(held) else {
        return Ok(());
    };

    let dimension = checked_shift(&caps[2], tally.combined(), "write port array dimension")?;
    let rewritten = format!("   {}[{}];", &caps[1], dimension);
    trace(config, "ARRAY", held, &rewritten);
    out.replace_held(rewritten);
    Ok(())
}

/// Redirect a host-memory-bridge port map to its intermediate wire.
///
/// Standard ports target `avm_kernel_bus_adaption_<port * per_lsu + sub>_<signal>`.
/// With the lock service disabled, lock-service port maps share that target;
/// enabled, the atomic sub-port (index 1) targets
/// `avm_lockservice_bus_adaption_<port>_<signal>`.
fn redirect_bridge_port(out: &mut Lookback, kernel: &KernelPatterns, config: &FixupConfig) -> PatchResult<()> {
    let Some(held) = out.held() else {
        return Ok(());
    };
    let Some(caps) = kernel.bridge_portmap.captures(held) else {
        return Ok(());
    };

    let port_index: u64 = caps[1]
        .parse()
        .map_err(|_| PatchError::StructuralAssumption(format!("bad port index in '{}'", held)))?;
    let sub_index: u64 = caps[7]
        .parse()
        .map_err(|_| PatchError::StructuralAssumption(format!("bad sub-port index in '{}'", held)))?;
    let signal = &caps[8];

    let category = match config.lock_service {
        LockServiceMode::Enabled if sub_index == 1 => PortCategory::LockService,
        _ => PortCategory::Svm,
    };
    let target = match category {
        PortCategory::Svm => format!(
            "{}_{}",
            templates::wire_name(category, (port_index * config.avm_ports_per_lsu as u64 + sub_index) as usize),
            signal
        ),
        PortCategory::LockService => {
            format!("{}_{}", templates::wire_name(category, port_index as usize), signal)
        }
    };

    // The op name is repeated after the a0b1c2d3 marker, as the generated wrapper spells it.
    let rewritten = format!(
        "       .avm_efi_{kernel}_{port}_host_memory_bridge{op}{variant}_{bits}bit_host_memory_bridge{bridge}_a0b1c2d3{op}_{bits}bit_{sub}_inst0_{signal}({target}),",
        kernel = kernel.kernel.name(),
        port = &caps[1],
        op = &caps[2],
        variant = &caps[3],
        bits = &caps[4],
        bridge = &caps[5],
        sub = &caps[7],
        signal = signal,
        target = target,
    );
    trace(config, "REMAP", held, &rewritten);
    out.replace_held(rewritten);
    Ok(())
}

/// `.NUM_WR_PORT(N)` -> `N - new ports`
fn lower_write_port_count(out: &mut Lookback, tally: PortTally, config: &FixupConfig) -> PatchResult<()> {
    let Some(held) = out.held() else {
        return Ok(());
    };
    let Some(caps) = NUM_WR_PORT_REGEX.captures(held) else {
        return Ok(());
    };

    let count = checked_shift(&caps[1], tally.combined(), "NUM_WR_PORT")?;
    let rewritten = format!("       .NUM_WR_PORT({}){}", count, &caps[2]);
    trace(config, "NUM_WR_PORT", held, &rewritten);
    out.replace_held(rewritten);
    Ok(())
}

/// Pass 2: insert one kernel's new ports and relink its bridge port maps.
pub fn insert_kernel_ports(
    buffer: &LineBuffer,
    system: &SystemPatterns,
    kernel: &KernelPatterns,
    tally: PortTally,
    config: &FixupConfig,
) -> PatchResult<LineBuffer> {
    let mut state = ScanState::new();
    let mut out = Lookback::new();

    for line in buffer.lines() {
        if system.module_header.is_match(line) {
            state.on_module_header();
        }
        if state.in_module() && ENDMODULE_REGEX.is_match(line) {
            state.on_endmodule();
        }

        if state.region == ModuleRegion::Header
            && OPEN_PAREN_REGEX.is_match(line)
            && out.held().map_or(false, |prev| system.module_header.is_match(prev))
        {
            state.region = ModuleRegion::PortList;
        }

        if state.region == ModuleRegion::PortList && CLOSE_PAREN_REGEX.is_match(line) {
            close_port_list(&mut out, tally, config);
            state.region = ModuleRegion::BodyPreBlank;
        }

        if state.in_body() {
            shrink_write_array(&mut out, tally, config)?;
        }

        if state.region == ModuleRegion::BodyPreBlank && BLANK_LINE_REGEX.is_match(line) {
            state.region = ModuleRegion::BodyPostBlank;
            // Numbered from 0 for every kernel; two kernels yield duplicate adapter names.
            for category in CATEGORIES {
                for index in 0..tally.count(category) {
                    out.emit_block(templates::adapter_block(category, index, &config.bus));
                }
            }
        }

        state.track_component(line, kernel);
        if state.in_component {
            redirect_bridge_port(&mut out, kernel, config)?;
        }
        state.leave_component_on_close(line);

        if state.in_module()
            && GENERIC_MAP_OPEN_REGEX.is_match(line)
            && out.held().map_or(false, |prev| LSU_IC_TOP_REGEX.is_match(prev))
        {
            state.in_generic_map = true;
        }
        if state.in_generic_map {
            lower_write_port_count(&mut out, tally, config)?;
        }

        out.emit(line.as_str());
    }

    Ok(buffer.with_lines(out.finish()))
}

/// Pass 3: shift the kernel's write-array port map indices below the new ports.
///
/// Fails with `PatchError::StructuralAssumption` when an index would go
/// negative, i.e. the SVM ports did not occupy the lowest array indices.
pub fn renumber_write_ports(
    buffer: &LineBuffer,
    system: &SystemPatterns,
    kernel: &KernelPatterns,
    totals: PortTotals,
    config: &FixupConfig,
) -> PatchResult<LineBuffer> {
    let mut state = ScanState::new();
    let mut out = Lookback::new();

    for line in buffer.lines() {
        if system.module_header.is_match(line) {
            state.on_module_header();
        }
        if state.in_module() && ENDMODULE_REGEX.is_match(line) {
            state.on_endmodule();
        }
        state.track_component(line, kernel);

        if state.in_component {
            if let Some(held) = out.held() {
                if let Some(caps) = WRITE_ARRAY_PORTMAP_REGEX.captures(held) {
                    let index = checked_shift(&caps[3], totals.combined(), "write port array index")?;
                    let rewritten = format!("       {}({}[{}]){}", &caps[1], &caps[2], index, &caps[4]);
                    trace(config, "RENUMBER", held, &rewritten);
                    out.replace_held(rewritten);
                }
            }
        }

        state.leave_component_on_close(line);
        out.emit(line.as_str());
    }

    Ok(buffer.with_lines(out.finish()))
}

/// Run all passes for every kernel over the system description.
///
/// With no kernels the buffer is returned unchanged.
pub fn rewrite_system(
    buffer: &LineBuffer,
    project: &str,
    kernels: &[Kernel],
    config: &FixupConfig,
) -> PatchResult<SystemRewrite> {
    let system = SystemPatterns::new(project)?;
    let kernel_patterns = kernels
        .iter()
        .map(KernelPatterns::new)
        .collect::<PatchResult<Vec<_>>>()?;

    let mut current = buffer.clone();
    let mut tallies = Vec::with_capacity(kernels.len());
    let mut totals = PortTotals::default();

    for patterns in &kernel_patterns {
        let tally = count_kernel_ports(current.lines(), &system, patterns, config);
        log::info!(
            "[Rewrite] Number of SVM LSU instantiations in kernel {}: {}",
            patterns.kernel, tally.svm
        );
        log::info!(
            "[Rewrite] Number of atomic SVM LSU instantiations in kernel {}: {}",
            patterns.kernel, tally.lock_service
        );

        current = insert_kernel_ports(&current, &system, patterns, tally, config)?;
        tallies.push((patterns.kernel.clone(), tally));
        totals += tally;
    }

    for patterns in &kernel_patterns {
        current = renumber_write_ports(&current, &system, patterns, totals, config)?;
    }

    Ok(SystemRewrite {
        buffer: current,
        tallies,
        totals,
    })
}

impl super::SystemPatcher {
    /// Rewrite `<project>_system.v` in place and return the per-kernel tallies.
    pub fn rewrite_system_verilog(&self, kernels: &[Kernel], config: &FixupConfig) -> PatchResult<SystemRewrite> {
        let path = self.system_verilog_path();
        let buffer = LineBuffer::read(&path)?;
        log::info!("[Rewrite] File opened for parsing: {}", path.display());

        let rewrite = rewrite_system(&buffer, self.project(), kernels, config)?;
        if !kernels.is_empty() {
            rewrite.buffer.write(&path)?;
        }

        log::info!(
            "[Rewrite] Converted {} SVM and {} lock-service ports in {}",
            rewrite.totals.svm,
            rewrite.totals.lock_service,
            path.display()
        );
        Ok(rewrite)
    }
}
