//! Qsys component description patching.
//!
//! Each new AVM port of `<project>_system.v` needs a matching Avalon master
//! interface in `<project>_system_hw.tcl`, or the port is invisible to the
//! system integration tool. The declarations go directly in front of the
//! `QUARTUS_SYNTH` file set.

use super::lines::LineBuffer;
use super::patterns::QUARTUS_SYNTH_FILESET_REGEX;
use super::templates;
use super::PatchResult;
use crate::config::BusWidths;
use crate::models::{PortCategory, PortTotals};

/// Insert the interface declarations for `totals` before every file set anchor.
///
/// SVM ports come first, then lock-service ports, both numbered from 0. With no
/// anchor line the buffer is returned unchanged.
pub fn patch_hw_tcl_lines(buffer: &LineBuffer, totals: PortTotals, bus: &BusWidths) -> LineBuffer {
    let mut out = Vec::with_capacity(buffer.len() + totals.combined() * 20);
    let mut anchors = 0usize;

    for line in buffer.lines() {
        if QUARTUS_SYNTH_FILESET_REGEX.is_match(line) {
            anchors += 1;
            for category in [PortCategory::Svm, PortCategory::LockService] {
                for index in 0..totals.count(category) {
                    out.extend(templates::interface_declarations(category, index, bus));
                }
            }
        }
        out.push(line.clone());
    }

    if anchors == 0 {
        log::warn!("[HwTcl] No QUARTUS_SYNTH file set found, no interfaces declared");
    }

    buffer.with_lines(out)
}

impl super::SystemPatcher {
    /// Patch `<project>_system_hw.tcl` in place.
    pub fn patch_hw_tcl(&self, totals: PortTotals, bus: &BusWidths) -> PatchResult<()> {
        let path = self.system_hw_tcl_path();
        let buffer = LineBuffer::read(&path)?;
        log::info!("[HwTcl] File opened for parsing: {}", path.display());

        let patched = patch_hw_tcl_lines(&buffer, totals, bus);
        patched.write(&path)?;

        log::info!(
            "[HwTcl] Declared {} SVM and {} lock-service interfaces",
            totals.svm, totals.lock_service
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HW_TCL: &str = "package require -exact qsys 14.0\n\
set_module_property NAME vadd_system\n\
\n\
add_fileset QUARTUS_SYNTH QUARTUS_SYNTH \"\" \"\"\n\
set_fileset_property QUARTUS_SYNTH TOP_LEVEL vadd_system\n";

    #[test]
    fn test_interfaces_precede_anchor() {
        let buffer = LineBuffer::from_text(HW_TCL);
        let patched = patch_hw_tcl_lines(&buffer, PortTotals::new(2, 1), &BusWidths::default());
        let lines = patched.lines();

        let anchor = lines
            .iter()
            .position(|l| l.starts_with("add_fileset QUARTUS_SYNTH"))
            .unwrap();
        let headers: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.starts_with("### AVM "))
            .map(|(i, _)| i)
            .collect();

        assert_eq!(headers.len(), 3);
        assert!(headers.iter().all(|&i| i < anchor));
        assert_eq!(lines[headers[0]], "### AVM avm_svm_port_0_rw");
        assert_eq!(lines[headers[1]], "### AVM avm_svm_port_1_rw");
        assert_eq!(lines[headers[2]], "### AVM avm_lockservice_port_0_rw");
        assert_eq!(lines[anchor - 1], "");
    }

    #[test]
    fn test_no_ports_leaves_file_unchanged() {
        let buffer = LineBuffer::from_text(HW_TCL);
        let patched = patch_hw_tcl_lines(&buffer, PortTotals::default(), &BusWidths::default());
        assert_eq!(patched.to_text(), HW_TCL);
    }

    #[test]
    fn test_crlf_script_keeps_crlf() {
        let crlf = HW_TCL.replace('\n', "\r\n");
        let buffer = LineBuffer::from_text(&crlf);

        let untouched = patch_hw_tcl_lines(&buffer, PortTotals::default(), &BusWidths::default());
        assert_eq!(untouched.to_text(), crlf);

        let patched = patch_hw_tcl_lines(&buffer, PortTotals::new(1, 0), &BusWidths::default());
        let text = patched.to_text();
        assert!(text.contains("### AVM avm_svm_port_0_rw\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_missing_anchor_leaves_file_unchanged() {
        let buffer = LineBuffer::from_text("set_module_property NAME vadd_system\n");
        let patched = patch_hw_tcl_lines(&buffer, PortTotals::new(1, 0), &BusWidths::default());
        assert_eq!(patched, buffer);
    }
}
