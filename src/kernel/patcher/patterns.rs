//! Line patterns recognised in the generated system description.
//!
//! Patterns match a single line without its terminator. Project- and
//! kernel-specific patterns are built once per run from escaped names.

use once_cell::sync::Lazy;
use regex::Regex;

use super::PatchResult;
use crate::error::PatchError;
use crate::models::Kernel;

pub static ENDMODULE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*endmodule\s*$").expect("Invalid endmodule regex")
});
pub static OPEN_PAREN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\(\s*$").expect("Invalid open parenthesis regex")
});
pub static CLOSE_PAREN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\);\s*$").expect("Invalid close parenthesis regex")
});
pub static BLANK_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*$").expect("Invalid blank line regex")
});
/// `logic [511:0] avm_kernel_wr_writedata [12];` captures (declaration head, dimension)
pub static WRITE_ARRAY_DECL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(logic\s+\[?[0-9]*:?[0-9]*\]?\s*avm_kernel_wr_[a-z]+\s*)\[([0-9]+)\];\s*$")
        .expect("Invalid write array declaration regex")
});
pub static LSU_IC_TOP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*lsu_ic_top\s*$").expect("Invalid lsu_ic_top regex")
});
pub static GENERIC_MAP_OPEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\(\s*$").expect("Invalid generic map regex")
});
/// `.NUM_WR_PORT(14),` captures (count, optional comma)
pub static NUM_WR_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\.NUM_WR_PORT\s*\(([0-9]+)\)(,?)\s*$")
        .expect("Invalid NUM_WR_PORT regex")
});
/// `.avm_local_bb2_st_x_enable(avm_kernel_wr_enable[5]),` captures
/// (port map head, array name, index, optional comma)
pub static WRITE_ARRAY_PORTMAP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\.avm_local_bb[0-9]+_st_.+)\s*\((avm_kernel_wr_[a-z]+)\[([0-9]+)\]\)(,?)\s*$")
        .expect("Invalid write array port map regex")
});
/// Anchor of the synthesis file set in `<project>_system_hw.tcl`
pub static QUARTUS_SYNTH_FILESET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*add_fileset\s+QUARTUS_SYNTH\s+QUARTUS_SYNTH\s+""\s+""$"#)
        .expect("Invalid QUARTUS_SYNTH file set regex")
});

fn compile(pattern: &str) -> PatchResult<Regex> {
    Regex::new(pattern).map_err(|e| PatchError::RegexInvalid(format!("{}: {}", pattern, e)))
}

/// Patterns tied to the `<project>_system` module.
#[derive(Debug, Clone)]
pub struct SystemPatterns {
    pub module_header: Regex,
}

impl SystemPatterns {
    pub fn new(project: &str) -> PatchResult<Self> {
        Ok(SystemPatterns {
            module_header: compile(&format!(
                r"^\s*module\s*{}_system\s*$",
                regex::escape(project)
            ))?,
        })
    }
}

/// Patterns tied to one kernel's `<kernel>_top_wrapper` instance.
#[derive(Debug, Clone)]
pub struct KernelPatterns {
    pub kernel: Kernel,
    /// `<kernel>_top_wrapper <kernel>`
    pub instance: Regex,
    /// One enable port map per host-memory-bridge AVM port
    pub bridge_enable: Regex,
    /// Enable port maps of the atomic sub-port (index 1)
    pub atomic_enable: Regex,
    /// Any host-memory-bridge port map; captures
    /// (port index, op, variant, bits, bridge variant, op2, sub-port index, signal)
    pub bridge_portmap: Regex,
}

impl KernelPatterns {
    pub fn new(kernel: &Kernel) -> PatchResult<Self> {
        let name = regex::escape(kernel.name());
        Ok(KernelPatterns {
            kernel: kernel.clone(),
            instance: compile(&format!(r"^\s*{0}_top_wrapper\s+{0}\s*$", name))?,
            bridge_enable: compile(&format!(
                r"^\s*\.avm_efi_{}_[0-9]+_host_memory_bridge_[a-z]+_?[a-z]*_[0-9]+bit_host_memory_bridge_?[a-z]*_a0b1c2d3_[a-z]+_[0-9]+bit_[0-9]+_inst0_enable.+$",
                name
            ))?,
            atomic_enable: compile(&format!(
                r"^\s*\.avm_efi_{}_[0-9]+_host_memory_bridge_[a-z]+_?[a-z]*_[0-9]+bit_host_memory_bridge_?[a-z]*_a0b1c2d3_[a-z]+_[0-9]+bit_1_inst0_enable.+$",
                name
            ))?,
            bridge_portmap: compile(&format!(
                r"(?i)^\s*\.avm_efi_{}_([0-9]+)_host_memory_bridge(_[a-z]+)(_?[a-z]*)_([0-9]+)bit_host_memory_bridge(_?[a-z]*)_a0b1c2d3(_[a-z]+)_[0-9]+bit_([0-9]+)_inst0_([a-z]+).+$",
                name
            ))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENABLE_LINE: &str = "      .avm_efi_vadd_0_host_memory_bridge_load_512bit_host_memory_bridge_a0b1c2d3_load_512bit_0_inst0_enable(avm_kernel_rd_enable[0]),";

    #[test]
    fn test_structural_lines() {
        assert!(OPEN_PAREN_REGEX.is_match("  ("));
        assert!(CLOSE_PAREN_REGEX.is_match("  );  "));
        assert!(!CLOSE_PAREN_REGEX.is_match("  ); // end"));
        assert!(BLANK_LINE_REGEX.is_match(""));
        assert!(BLANK_LINE_REGEX.is_match("   \t"));
        assert!(ENDMODULE_REGEX.is_match("endmodule"));
    }

    #[test]
    fn test_system_module_header() {
        let patterns = SystemPatterns::new("vadd").unwrap();
        assert!(patterns.module_header.is_match("module vadd_system"));
        assert!(!patterns.module_header.is_match("module vadd_system_acl_iface"));
        assert!(!patterns.module_header.is_match("module other_system"));
    }

    #[test]
    fn test_kernel_patterns() {
        let patterns = KernelPatterns::new(&Kernel::new("vadd")).unwrap();
        assert!(patterns.instance.is_match("  vadd_top_wrapper vadd"));
        assert!(patterns.bridge_enable.is_match(ENABLE_LINE));
        assert!(!patterns.atomic_enable.is_match(ENABLE_LINE));

        let caps = patterns.bridge_portmap.captures(ENABLE_LINE).unwrap();
        assert_eq!(&caps[1], "0");
        assert_eq!(&caps[2], "_load");
        assert_eq!(&caps[4], "512");
        assert_eq!(&caps[6], "_load");
        assert_eq!(&caps[7], "0");
        assert_eq!(&caps[8], "enable");
    }

    #[test]
    fn test_kernel_name_is_escaped() {
        let patterns = KernelPatterns::new(&Kernel::new("a.b")).unwrap();
        assert!(patterns.instance.is_match("a.b_top_wrapper a.b"));
        assert!(!patterns.instance.is_match("axb_top_wrapper axb"));
    }

    #[test]
    fn test_write_array_portmap_captures() {
        let caps = WRITE_ARRAY_PORTMAP_REGEX
            .captures("       .avm_local_bb2_st__enable(avm_kernel_wr_enable[5]),")
            .unwrap();
        assert_eq!(&caps[1], ".avm_local_bb2_st__enable");
        assert_eq!(&caps[2], "avm_kernel_wr_enable");
        assert_eq!(&caps[3], "5");
        assert_eq!(&caps[4], ",");
    }

    #[test]
    fn test_fileset_anchor() {
        assert!(QUARTUS_SYNTH_FILESET_REGEX.is_match(r#"add_fileset QUARTUS_SYNTH QUARTUS_SYNTH "" """#));
        assert!(!QUARTUS_SYNTH_FILESET_REGEX.is_match(r#"add_fileset SIM_VERILOG SIM_VERILOG "" """#));
    }
}
